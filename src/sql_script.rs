use chrono::{DateTime, Local};
use itertools::Itertools;

use crate::category::Category;
use crate::company::{dedupe_sorted, Company, ParsedLine, SlugRegistry};

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const RULE: &str = "-- ===============================================";
const INSERT_HEADER: &str = "INSERT INTO \"Company\" (name, slug, description, ville, adresse, tel, activite, \"categoryId\", \"createdAt\", \"updatedAt\") VALUES";

pub const DEFAULT_CATEGORY_NOTE_PREFIX: &str =
    "-- This script will insert companies into the default category";
pub const CATEGORIZED_NOTE: &str =
    "-- Companies have been automatically categorized based on their business activities";

#[derive(Debug, Clone)]
pub struct ScriptOptions {
    pub batch_size: usize,
    pub default_category: Category,
    pub generated_at: DateTime<Local>,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        ScriptOptions {
            batch_size: DEFAULT_BATCH_SIZE,
            default_category: Category::Banking,
            generated_at: Local::now(),
        }
    }
}

/// Dedupe, sort and slug the parsed lines into table rows.
pub fn build_companies(
    lines: Vec<ParsedLine>,
    slugs: &mut SlugRegistry,
    category: Category,
) -> Vec<Company> {
    dedupe_sorted(lines)
        .into_iter()
        .map(|line| {
            let slug = slugs.assign(&line.name);
            Company::from_parsed(line, slug, category)
        })
        .collect()
}

pub fn render_script(companies: &[Company], opts: &ScriptOptions) -> String {
    let total = companies.len();
    let category_id = opts.default_category.id();
    let mut out: Vec<String> = Vec::new();

    out.push(RULE.to_string());
    out.push("-- Companies Extracted from PDF Files".to_string());
    out.push("-- EchoWork Database".to_string());
    out.push("-- PostgreSQL SQL Script".to_string());
    out.push(RULE.to_string());
    out.push(format!("-- Generated: {}", opts.generated_at.format(TIMESTAMP_FORMAT)));
    out.push(format!("-- Total companies: {}", total));
    out.push(RULE.to_string());
    out.push(String::new());
    out.push("-- Note: This assumes the Company table exists (run Prisma migrations first)".to_string());
    out.push(format!(
        "{} (categoryId = {})",
        DEFAULT_CATEGORY_NOTE_PREFIX, category_id
    ));
    out.push("-- You may want to update categoryId after import to properly categorize companies".to_string());
    out.push(String::new());
    out.push(RULE.to_string());
    out.push("-- CREATE TABLE (for reference - uncomment if needed)".to_string());
    out.push(RULE.to_string());
    out.extend(
        [
            "/*",
            "CREATE TABLE IF NOT EXISTS \"Company\" (",
            "  id SERIAL PRIMARY KEY,",
            "  name VARCHAR(255) NOT NULL,",
            "  slug VARCHAR(255) UNIQUE NOT NULL,",
            "  description TEXT,",
            "  \"imageUrl\" VARCHAR(500),",
            "  ville VARCHAR(100),",
            "  adresse TEXT,",
            "  tel VARCHAR(50),",
            "  activite TEXT,",
            "  \"categoryId\" INTEGER NOT NULL,",
            "  \"createdAt\" TIMESTAMP DEFAULT NOW(),",
            "  \"updatedAt\" TIMESTAMP DEFAULT NOW()",
            ");",
            "*/",
            "",
        ]
        .map(String::from),
    );
    out.push(RULE.to_string());
    out.push("-- INSERT COMPANIES".to_string());
    out.push(RULE.to_string());
    out.push(format!(
        "-- Using categoryId = {} as default (update as needed)",
        category_id
    ));
    out.push("-- ON CONFLICT DO NOTHING prevents duplicate insertions if re-run".to_string());
    out.push(String::new());

    let batch_size = opts.batch_size.max(1);
    for (idx, batch) in companies.chunks(batch_size).enumerate() {
        let first = idx * batch_size + 1;
        let last = first + batch.len() - 1;
        out.push(format!("-- Batch {}: Companies {} to {}", idx + 1, first, last));
        out.push(INSERT_HEADER.to_string());
        out.push(batch.iter().map(|c| format!("  {}", c.to_sql_tuple())).join(",\n"));
        out.push("ON CONFLICT (slug) DO NOTHING;".to_string());
        out.push(String::new());
    }

    out.push(RULE.to_string());
    out.push("-- RESET SEQUENCE".to_string());
    out.push(RULE.to_string());
    out.push("SELECT setval('\"Company_id_seq\"', (SELECT MAX(id) FROM \"Company\"));".to_string());
    out.push(String::new());
    out.push(RULE.to_string());
    out.push("-- VERIFICATION QUERY".to_string());
    out.push(RULE.to_string());
    out.push("-- Run this to verify import:".to_string());
    out.push("-- SELECT COUNT(*) as total_companies FROM \"Company\";".to_string());
    out.push("-- SELECT ville, COUNT(*) as count FROM \"Company\" GROUP BY ville ORDER BY count DESC;".to_string());
    out.push(String::new());
    out.push(RULE.to_string());
    out.push("-- IMPORT COMPLETE".to_string());
    out.push(RULE.to_string());
    out.push(format!("-- Successfully prepared {} companies for import", total));
    out.push(RULE.to_string());

    out.join("\n")
}
