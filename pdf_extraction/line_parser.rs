use regex::Regex;
use std::sync::OnceLock;

use echowork_seed::utils::{first_keyword_position, normalize_text, word_regex};
use echowork_seed::ParsedLine;

const MIN_LINE_CHARS: usize = 10;
const MIN_NAME_CHARS: usize = 2;
const HALF_SPLIT_MIN_WORDS: usize = 5;

pub const CITIES: &[&str] = &[
    "Dakar", "Thies", "Thiès", "Saint-Louis", "Kaolack", "Ziguinchor", "Louga", "Matam",
    "Tambacounda", "Kolda", "Sedhiou", "Kaffrine", "Kedougou", "Kédougou", "Rufisque", "Mbour",
    "Touba", "Diourbel", "Fatick", "Guediaw Aye", "Richard Toll", "Linguere", "Linguère",
    "Podor", "Kanel", "Vélingara", "Velingara", "Oussouye", "Bignona", "Foundiougne", "Gossas",
    "Koungheul", "Saraya", "Salémata", "Salemata", "Nioro", "Kahone", "Bambey", "Tivaouane",
    "Mbacké", "Mbacke", "Kébémer", "Kebemer", "Joal-Fadiouth", "Pout", "Khombole",
];

const ADDRESS_KEYWORDS: &[&str] = &[
    "Route", "Rue", "Avenue", "Bd", "Boulevard", "Place", "Zone", "Quartier", "Cite", "Cité",
    "Villa", "Immeuble", "Point", "Corniche", "Rocade", "Face", "Angle", "Carrefour", "Voie",
];

const ACTIVITY_KEYWORDS: &[&str] = &[
    "Vente", "Commerce", "Services", "Service", "Fabrication", "Distribution", "Production",
    "Travaux", "Import", "Export", "Industrie", "Pharmacie", "Restaurant", "Hotel", "Hôtel",
    "Banque", "Assurance", "Transport", "Construction", "Grossiste", "Repartition",
    "Répartition", "Promotion",
];

fn keyword_set(cell: &'static OnceLock<Vec<Regex>>, words: &[&str]) -> &'static [Regex] {
    cell.get_or_init(|| words.iter().filter_map(|w| word_regex(w)).collect())
}

fn address_keywords() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    keyword_set(&RE, ADDRESS_KEYWORDS)
}

fn activity_keywords() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    keyword_set(&RE, ACTIVITY_KEYWORDS)
}

fn phone_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            r"\b(33\s*\d{3}\s*\d{2}\s*\d{2})\s*$",
            r"\b(33\s*\d{7,})\s*$",
            r"\b(7[0-8]\s*\d{3}\s*\d{2}\s*\d{2})\s*$",
            r"\b(7[0-8]\s*\d{7,})\s*$",
            r"\b(\d{2}\s*\d{3}\s*\d{2}\s*\d{2})\s*$",
            r"\b(0\s*\d{9})\s*$",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Split a trailing phone number off `text`.
/// Returns `(phone, rest)`; phone is empty and rest untouched when none matches.
pub fn extract_phone_from_end(text: &str) -> (String, String) {
    for re in phone_patterns() {
        if let Some(caps) = re.captures(text) {
            let (Some(whole), Some(phone)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            return (
                phone.as_str().to_string(),
                text[..whole.start()].trim().to_string(),
            );
        }
    }
    (String::new(), text.to_string())
}

fn is_header_line(line: &str) -> bool {
    line.contains("Ville") && line.contains("Entreprise")
}

fn strip_city(line: &str) -> Option<(&'static str, &str)> {
    CITIES.iter().find_map(|city| {
        line.strip_prefix(city)
            .and_then(|rest| rest.strip_prefix(' '))
            .map(|rest| (*city, rest.trim()))
    })
}

/// Split at the first matching keyword when it is not at the very start.
fn split_at_keyword<'a>(text: &'a str, keywords: &[Regex]) -> Option<(&'a str, &'a str)> {
    match first_keyword_position(text, keywords) {
        Some(pos) if pos > 0 => Some((text[..pos].trim(), text[pos..].trim())),
        _ => None,
    }
}

/// Name/activity split. The half-by-word-count fallback only applies to text
/// that preceded an address.
fn split_name_activity(text: &str, half_split: bool) -> (String, String) {
    if let Some((name, activite)) = split_at_keyword(text, activity_keywords()) {
        return (name.to_string(), activite.to_string());
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if half_split && words.len() >= HALF_SPLIT_MIN_WORDS {
        let (name, activite) = words.split_at(words.len() / 2);
        (name.join(" "), activite.join(" "))
    } else {
        (text.to_string(), String::new())
    }
}

fn trim_trailing_hyphen(name: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\s*-\s*$").unwrap());
    re.replace(name, "").trim().to_string()
}

/// Parse one extracted text line into company fields, or `None` when the line
/// is not a listing.
pub fn parse_company_line(raw: &str) -> Option<ParsedLine> {
    let line = normalize_text(raw);
    if line.chars().count() < MIN_LINE_CHARS || is_header_line(&line) {
        return None;
    }

    let (ville, rest) = strip_city(&line)?;
    let (tel, remaining) = extract_phone_from_end(rest);
    if remaining.is_empty() {
        return None;
    }

    let (name, activite, adresse) = match split_at_keyword(&remaining, address_keywords()) {
        Some((before, address)) => {
            let (name, activite) = split_name_activity(before, true);
            (name, activite, address.to_string())
        }
        None => {
            let (name, activite) = split_name_activity(&remaining, false);
            (name, activite, String::new())
        }
    };

    let name = trim_trailing_hyphen(&name);
    if name.chars().count() < MIN_NAME_CHARS {
        return None;
    }

    Some(ParsedLine {
        ville: ville.to_string(),
        name,
        activite,
        adresse,
        tel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_listing_line() {
        let parsed =
            parse_company_line("Dakar ABC Trading Vente de matériel Rue 10 Dakar 33 823 45 67")
                .unwrap();
        assert_eq!(parsed.ville, "Dakar");
        assert_eq!(parsed.tel, "33 823 45 67");
        assert_eq!(parsed.adresse, "Rue 10 Dakar");
        assert_eq!(parsed.activite, "Vente de matériel");
        assert_eq!(parsed.name, "ABC Trading");
    }

    #[test]
    fn phone_suffix() {
        assert_eq!(
            extract_phone_from_end("ABC Trading Rue 10 33 823 45 67"),
            ("33 823 45 67".to_string(), "ABC Trading Rue 10".to_string())
        );
        assert_eq!(
            extract_phone_from_end("Sen Auto 77 123 45 67  "),
            ("77 123 45 67".to_string(), "Sen Auto".to_string())
        );
        assert_eq!(
            extract_phone_from_end("Sen Auto 0123456789"),
            ("0123456789".to_string(), "Sen Auto".to_string())
        );
        assert_eq!(
            extract_phone_from_end("Sen Auto sans numero"),
            (String::new(), "Sen Auto sans numero".to_string())
        );
    }

    #[test]
    fn rejects_short_header_and_unknown_city() {
        assert_eq!(parse_company_line("Dakar ABC"), None);
        assert_eq!(parse_company_line("Ville Entreprise Activité Adresse Téléphone"), None);
        assert_eq!(parse_company_line("Paris ABC Trading Vente Rue 10"), None);
        // city must be followed by a space
        assert_eq!(parse_company_line("Dakarois Trading Vente de riz"), None);
    }

    #[test]
    fn phone_only_remainder_is_rejected() {
        assert_eq!(parse_company_line("Louga 33 967 11 22"), None);
    }

    #[test]
    fn multiword_city_and_whitespace_noise() {
        let parsed = parse_company_line("  Richard   Toll  CSS  Production de sucre ").unwrap();
        assert_eq!(parsed.ville, "Richard Toll");
        assert_eq!(parsed.name, "CSS");
        assert_eq!(parsed.activite, "Production de sucre");
        assert_eq!(parsed.adresse, "");
        assert_eq!(parsed.tel, "");
    }

    #[test]
    fn decomposed_accents_still_match_city() {
        let parsed = parse_company_line("Thie\u{0300}s Garage Ndiaye Route de Dakar").unwrap();
        assert_eq!(parsed.ville, "Thiès");
        assert_eq!(parsed.name, "Garage Ndiaye");
        assert_eq!(parsed.adresse, "Route de Dakar");
    }

    #[test]
    fn address_keyword_list_order_beats_text_order() {
        // "Zone" appears first in the text but "Rue" is earlier in the list
        let parsed = parse_company_line("Dakar Sotiba Zone Franche Rue 6").unwrap();
        assert_eq!(parsed.adresse, "Rue 6");
        assert_eq!(parsed.name, "Sotiba Zone Franche");
    }

    #[test]
    fn half_split_before_address() {
        let parsed =
            parse_company_line("Kaolack Alpha Beta Gamma Delta Epsilon Zeta Rue 5").unwrap();
        assert_eq!(parsed.name, "Alpha Beta Gamma");
        assert_eq!(parsed.activite, "Delta Epsilon Zeta");
        assert_eq!(parsed.adresse, "Rue 5");

        let parsed = parse_company_line("Kaolack Alpha Beta Gamma Delta Epsilon Rue 5").unwrap();
        assert_eq!(parsed.name, "Alpha Beta");
        assert_eq!(parsed.activite, "Gamma Delta Epsilon");
    }

    #[test]
    fn four_words_before_address_stay_in_name() {
        let parsed = parse_company_line("Mbour Alpha Beta Gamma Delta Rue 5").unwrap();
        assert_eq!(parsed.name, "Alpha Beta Gamma Delta");
        assert_eq!(parsed.activite, "");
    }

    #[test]
    fn no_address_keeps_long_text_as_name() {
        let parsed = parse_company_line("Kaolack Alpha Beta Gamma Delta Epsilon Zeta").unwrap();
        assert_eq!(parsed.name, "Alpha Beta Gamma Delta Epsilon Zeta");
        assert_eq!(parsed.activite, "");
    }

    #[test]
    fn keyword_at_start_is_not_a_split() {
        let parsed = parse_company_line("Dakar Pharmacie du Plateau").unwrap();
        assert_eq!(parsed.name, "Pharmacie du Plateau");
        assert_eq!(parsed.activite, "");
    }

    #[test]
    fn trailing_hyphen_is_trimmed() {
        let parsed = parse_company_line("Touba Keur Serigne - Commerce general").unwrap();
        assert_eq!(parsed.name, "Keur Serigne");
        assert_eq!(parsed.activite, "Commerce general");
    }

    #[test]
    fn one_letter_name_is_rejected() {
        assert_eq!(parse_company_line("Dakar X Vente de tissus"), None);
    }
}
