use std::fmt;

use regex::Regex;
use serde::Deserialize;

use crate::utils::normalize_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Banking = 1,
    Restaurants = 2,
    PublicServices = 3,
    Hotels = 4,
    Health = 5,
    Retail = 6,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Banking,
        Category::Restaurants,
        Category::PublicServices,
        Category::Hotels,
        Category::Health,
        Category::Retail,
    ];

    /// Checked in this order; the first category with any keyword hit wins.
    pub const PRIORITY: [Category; 5] = [
        Category::Health,
        Category::Restaurants,
        Category::Hotels,
        Category::Banking,
        Category::PublicServices,
    ];

    pub const FALLBACK: Category = Category::Retail;

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Banking => "Banques",
            Category::Restaurants => "Restaurants",
            Category::PublicServices => "Services publics",
            Category::Hotels => "Hôtels",
            Category::Health => "Santé",
            Category::Retail => "Vente au détail",
        }
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Health => &[
                "pharmacie",
                "medical",
                "sante",
                "santé",
                "hopital",
                "hôpital",
                "clinique",
                "hemodialyse",
                "laboratoire",
                "cabinet medical",
                "centre de sante",
                "centre médical",
                "soins",
                "diagnostic",
                "dispensaire",
                "infirmerie",
                "chirurgie",
                "consultation",
                "dentaire",
                "ophtalmologie",
                "radiologie",
                "nephrologie",
            ],
            Category::Restaurants => &[
                "restaurant",
                "bar",
                "cafe",
                "café",
                "patisserie",
                "pâtisserie",
                "boulangerie",
                "fast food",
                "traiteur",
                "alimentation",
                "snack",
                "pizzeria",
                "bistro",
                "brasserie",
                "cantine",
            ],
            Category::Hotels => &[
                "hotel",
                "hôtel",
                "hotelerie",
                "hôtellerie",
                "auberge",
                "gite",
                "gîte",
                "motel",
                "residence hoteliere",
                "résidence hôtelière",
                "pension",
                "hebergement",
                "hébergement",
                "lodge",
            ],
            Category::Banking => &[
                "banque",
                "bank",
                "credit",
                "crédit",
                "microfinance",
                "micro-finance",
                "etablissement financier",
                "établissement financier",
                "institution financiere",
                "institution financière",
                "caisse",
                "mutuelle de credit",
                "mutuelle de crédit",
                "pret",
                "prêt",
            ],
            Category::PublicServices => &[
                "service public",
                "poste",
                "telecommunication",
                "télécommunication",
                "electricite",
                "électricité",
                "eau",
                "assainissement",
                "senelec",
                "sen eau",
                "sonatel",
                "orange",
                "tigo",
                "expresso",
                "administration",
                "mairie",
                "prefecture",
                "préfecture",
            ],
            Category::Retail => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id(), self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    #[default]
    WholeWord,
    Substring,
}

/// Keyword classifier over `name` + `activite`.
#[derive(Debug)]
pub struct Classifier {
    mode: MatchMode,
    // one alternation per category, in priority order
    word_sets: Vec<(Category, Regex)>,
}

impl Classifier {
    pub fn new(mode: MatchMode) -> Self {
        let word_sets = Category::PRIORITY
            .into_iter()
            .map(|cat| {
                let alternation = cat
                    .keywords()
                    .iter()
                    .map(|k| regex::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                let re = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap();
                (cat, re)
            })
            .collect();
        Classifier { mode, word_sets }
    }

    pub fn classify(&self, name: &str, activite: &str) -> Category {
        // decomposed accents would otherwise break word boundaries
        let text = normalize_text(&format!("{} {}", name, activite)).to_lowercase();
        match self.mode {
            MatchMode::WholeWord => self
                .word_sets
                .iter()
                .find(|(_, re)| re.is_match(&text))
                .map(|(cat, _)| *cat),
            MatchMode::Substring => Category::PRIORITY
                .into_iter()
                .find(|cat| cat.keywords().iter().any(|k| text.contains(k))),
        }
        .unwrap_or(Category::FALLBACK)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(MatchMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_id(cat.id()), Some(cat));
        }
        assert_eq!(Category::from_id(0), None);
        assert_eq!(Category::from_id(7), None);
    }

    #[test]
    fn pharmacy_is_health() {
        let c = Classifier::default();
        assert_eq!(
            c.classify("Pharmacie Ndiaye", "pharmacie et parapharmacie"),
            Category::Health
        );
        let s = Classifier::new(MatchMode::Substring);
        assert_eq!(
            s.classify("Pharmacie Ndiaye", "pharmacie et parapharmacie"),
            Category::Health
        );
    }

    #[test]
    fn priority_beats_text_position() {
        // food keyword comes first in the text, health still wins
        for mode in [MatchMode::WholeWord, MatchMode::Substring] {
            let c = Classifier::new(mode);
            assert_eq!(
                c.classify("Restaurant Le Baobab", "cantine et clinique"),
                Category::Health
            );
            assert_eq!(c.classify("Hotel Teranga", "restaurant"), Category::Restaurants);
            assert_eq!(c.classify("Auberge du Lac", "crédit"), Category::Hotels);
        }
    }

    #[test]
    fn unmatched_is_retail() {
        let c = Classifier::default();
        assert_eq!(c.classify("Quincaillerie Fall", "Vente de matériel"), Category::Retail);
    }

    #[test]
    fn whole_word_ignores_embedded_keywords() {
        let word = Classifier::new(MatchMode::WholeWord);
        let sub = Classifier::new(MatchMode::Substring);
        // "bureau" contains "eau", "barbier" contains "bar"
        assert_eq!(word.classify("Bureau Barbier", ""), Category::Retail);
        assert_eq!(sub.classify("Bureau Barbier", ""), Category::Restaurants);
    }

    #[test]
    fn accented_and_multiword_keywords() {
        let c = Classifier::default();
        assert_eq!(c.classify("CMS", "Mutuelle de Crédit"), Category::Banking);
        assert_eq!(c.classify("SDE", "Sen Eau distribution"), Category::PublicServices);
        assert_eq!(c.classify("Résidence Hôtelière Ngor", ""), Category::Hotels);
    }

    #[test]
    fn decomposed_accents_match_composed_keywords() {
        for mode in [MatchMode::WholeWord, MatchMode::Substring] {
            let c = Classifier::new(mode);
            assert_eq!(c.classify("CSM", "Centre de sante\u{0301}"), Category::Health);
            assert_eq!(c.classify("Ho\u{0302}tel Teranga", ""), Category::Hotels);
            assert_eq!(c.classify("Hôtel Teranga", ""), Category::Hotels);
        }
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Category::Health.to_string(), "5. Santé");
    }
}
