use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::category::Category;

pub const MAX_SLUG_LEN: usize = 100;

/// Fields recovered from one directory line, before slugs and escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub ville: String,
    pub name: String,
    pub activite: String,
    pub adresse: String,
    pub tel: String,
}

/// One row of the `"Company"` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub ville: String,
    pub adresse: String,
    pub tel: String,
    pub activite: String,
    pub category: Category,
}

impl Company {
    pub fn from_parsed(line: ParsedLine, slug: String, category: Category) -> Self {
        let description = describe(&line.activite, &line.ville);
        Company {
            name: line.name,
            slug,
            description,
            ville: line.ville,
            adresse: line.adresse,
            tel: line.tel,
            activite: line.activite,
            category,
        }
    }

    /// SQL tuple in the fixed ten-field shape.
    pub fn to_sql_tuple(&self) -> String {
        format!(
            "('{}', '{}', '{}', '{}', '{}', '{}', '{}', {}, NOW(), NOW())",
            escape_sql(&self.name),
            escape_sql(&self.slug),
            escape_sql(&self.description),
            escape_sql(&self.ville),
            escape_sql(&self.adresse),
            escape_sql(&self.tel),
            escape_sql(&self.activite),
            self.category.id()
        )
    }
}

pub fn describe(activite: &str, ville: &str) -> String {
    if activite.is_empty() {
        format!("Entreprise basée à {}", ville)
    } else {
        activite.to_string()
    }
}

pub fn escape_sql(text: &str) -> String {
    text.replace('\'', "''")
}

pub fn unescape_sql(text: &str) -> String {
    text.replace("''", "'")
}

/// Lowercase, ASCII-fold and hyphenate a display name.
pub fn slugify(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let non_alnum = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap());

    let folded: String = name
        .to_lowercase()
        .nfkd()
        .filter(|c| c.is_ascii())
        .collect::<String>()
        .to_ascii_lowercase();
    let hyphenated = non_alnum.replace_all(&folded, "-");
    let slug = clip_slug(hyphenated.trim_matches('-'), MAX_SLUG_LEN);

    if slug.is_empty() {
        fallback_slug(name)
    } else {
        slug
    }
}

fn fallback_slug(name: &str) -> String {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    format!("company-{}", hasher.finish() % 10_000)
}

fn clip_slug(slug: &str, max: usize) -> String {
    // slug is ASCII here, byte slicing is safe
    let end = slug.len().min(max);
    slug[..end].trim_matches('-').to_string()
}

/// Run-local slug allocator; repeated bases get `-1`, `-2`, ... suffixes.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    counts: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, name: &str) -> String {
        let base = slugify(name);
        let counter = self.counts.entry(base.clone()).or_insert(0);
        if *counter == 0 && !self.issued.contains(&base) {
            *counter = 1;
            self.issued.insert(base.clone());
            return base;
        }
        if *counter == 0 {
            *counter = 1;
        }
        loop {
            let suffix = format!("-{}", counter);
            let candidate = format!(
                "{}{}",
                clip_slug(&base, MAX_SLUG_LEN - suffix.len()),
                suffix
            );
            *counter += 1;
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.issued.len()
    }
}

/// Stable sort by `(ville, name)`, then keep the first row of every
/// case-insensitive `(name, ville)` pair.
pub fn dedupe_sorted(mut lines: Vec<ParsedLine>) -> Vec<ParsedLine> {
    lines.sort_by(|a, b| (&a.ville, &a.name).cmp(&(&b.ville, &b.name)));
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|l| seen.insert((l.name.to_lowercase(), l.ville.to_lowercase())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ville: &str, name: &str) -> ParsedLine {
        ParsedLine {
            ville: ville.to_string(),
            name: name.to_string(),
            activite: String::new(),
            adresse: String::new(),
            tel: String::new(),
        }
    }

    fn is_clean_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug.len() <= MAX_SLUG_LEN
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
    }

    #[test]
    fn slug_folds_accents() {
        assert_eq!(slugify("Société Générale Sénégal"), "societe-generale-senegal");
        assert_eq!(slugify("  L'Hôtel -- du Port!  "), "l-hotel-du-port");
    }

    #[test]
    fn slug_shape_holds_for_awkward_names() {
        let long = "Établissement ".repeat(20);
        let names = [
            "ABC Trading",
            "---",
            "日本語",
            "Ñandú & Cie",
            "a-b--c",
            long.as_str(),
            "x",
        ];
        for name in names {
            let slug = slugify(name);
            assert!(is_clean_slug(&slug), "bad slug {:?} for {:?}", slug, name);
        }
    }

    #[test]
    fn slug_fallback_is_deterministic() {
        let a = slugify("***");
        assert!(a.starts_with("company-"));
        assert_eq!(a, slugify("***"));
    }

    #[test]
    fn registry_disambiguates() {
        let mut reg = SlugRegistry::new();
        assert_eq!(reg.assign("Sen Auto"), "sen-auto");
        assert_eq!(reg.assign("SEN AUTO"), "sen-auto-1");
        assert_eq!(reg.assign("sen-auto"), "sen-auto-2");
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn registry_skips_already_issued_suffix() {
        let mut reg = SlugRegistry::new();
        assert_eq!(reg.assign("Garage 1"), "garage-1");
        assert_eq!(reg.assign("Garage"), "garage");
        assert_eq!(reg.assign("Garage"), "garage-2");
    }

    #[test]
    fn registry_keeps_long_slugs_in_bounds() {
        let mut reg = SlugRegistry::new();
        let name = "z".repeat(150);
        let first = reg.assign(&name);
        let second = reg.assign(&name);
        assert_eq!(first.len(), MAX_SLUG_LEN);
        assert!(second.len() <= MAX_SLUG_LEN);
        assert!(second.ends_with("-1"));
    }

    #[test]
    fn escaping_round_trips() {
        for s in ["", "'", "''", "L'Oasis", "it''s", "a'b'c'"] {
            assert_eq!(unescape_sql(&escape_sql(s)), s);
        }
        assert_eq!(escape_sql("Chez l'Ami"), "Chez l''Ami");
    }

    #[test]
    fn dedupe_keeps_first_after_sort() {
        let mut a = line("Dakar", "Sen Auto");
        a.tel = "first".to_string();
        let mut b = line("dakar", "SEN AUTO");
        b.tel = "second".to_string();
        let c = line("Thiès", "Sen Auto");
        let out = dedupe_sorted(vec![c.clone(), b, a]);
        assert_eq!(out.len(), 2);
        // "Dakar" sorts before "dakar"
        assert_eq!(out[0].tel, "first");
        assert_eq!(out[1], c);
    }

    #[test]
    fn description_falls_back_to_city() {
        assert_eq!(describe("", "Louga"), "Entreprise basée à Louga");
        assert_eq!(describe("Vente de riz", "Louga"), "Vente de riz");
    }

    #[test]
    fn tuple_shape() {
        let company = Company::from_parsed(
            ParsedLine {
                ville: "Dakar".to_string(),
                name: "Chez l'Ami".to_string(),
                activite: String::new(),
                adresse: "Rue 10".to_string(),
                tel: "33 823 45 67".to_string(),
            },
            "chez-l-ami".to_string(),
            Category::Banking,
        );
        assert_eq!(
            company.to_sql_tuple(),
            "('Chez l''Ami', 'chez-l-ami', 'Entreprise basée à Dakar', 'Dakar', 'Rue 10', '33 823 45 67', '', 1, NOW(), NOW())"
        );
    }
}
