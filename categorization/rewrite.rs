use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::Regex;
use tempfile::NamedTempFile;

use echowork_seed::sql_script::{CATEGORIZED_NOTE, DEFAULT_CATEGORY_NOTE_PREFIX, TIMESTAMP_FORMAT};
use echowork_seed::sql_tuples::company_tuples;
use echowork_seed::utils::read_input;
use echowork_seed::{Category, Classifier, Result, SeedError};

#[derive(Debug)]
pub struct Recategorized {
    pub content: String,
    pub total: usize,
    pub changed: usize,
    pub per_category: BTreeMap<Category, usize>,
}

fn generated_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"-- Generated: \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}").unwrap()
    })
}

fn default_note_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"{} \(categoryId = \d+\)\r?\n-- You may want to update categoryId after import to properly categorize companies",
            regex::escape(DEFAULT_CATEGORY_NOTE_PREFIX)
        ))
        .unwrap()
    })
}

/// Re-derive the category of every company tuple in `sql`. Only the category
/// code changes inside a tuple; the surrounding script is copied through,
/// apart from the generation timestamp and the default-category note.
pub fn recategorize(
    sql: &str,
    classifier: &Classifier,
    now: DateTime<Local>,
    interrupted: &AtomicBool,
) -> Result<Recategorized> {
    let mut out = String::with_capacity(sql.len());
    let mut per_category = BTreeMap::new();
    let mut total = 0;
    let mut changed = 0;
    let mut last = 0;

    for (span, tuple) in company_tuples(sql) {
        if interrupted.load(Ordering::SeqCst) {
            return Err(SeedError::Interrupted);
        }
        let category = classifier.classify(&tuple.name, &tuple.activite);
        if tuple.category_id != u32::from(category.id()) {
            changed += 1;
        }
        *per_category.entry(category).or_insert(0) += 1;
        total += 1;

        out.push_str(&sql[last..span.start]);
        out.push_str(&tuple.into_company(category).to_sql_tuple());
        last = span.end;
    }
    out.push_str(&sql[last..]);

    let stamp = format!("-- Generated: {}", now.format(TIMESTAMP_FORMAT));
    let out = generated_re().replace_all(&out, stamp.as_str());
    let out = default_note_re().replace_all(&out, CATEGORIZED_NOTE);

    Ok(Recategorized {
        content: out.into_owned(),
        total,
        changed,
        per_category,
    })
}

/// Read `input`, re-derive every category and write the result to `output`.
/// Nothing is written when the script holds no company tuples.
pub fn categorize_file(
    input: &Path,
    output: &Path,
    classifier: &Classifier,
    now: DateTime<Local>,
    interrupted: &AtomicBool,
) -> Result<Recategorized> {
    let sql = read_input(input)?;
    if interrupted.load(Ordering::SeqCst) {
        return Err(SeedError::Interrupted);
    }
    let result = recategorize(&sql, classifier, now, interrupted)?;
    if result.total == 0 {
        return Err(SeedError::ZeroMatches(input.to_path_buf()));
    }
    write_atomic(output, &result.content, interrupted)?;
    Ok(result)
}

/// Write to a temp file next to `path`, then rename it over `path`.
pub fn write_atomic(path: &Path, content: &str, interrupted: &AtomicBool) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |source| SeedError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    if interrupted.load(Ordering::SeqCst) {
        // dropping tmp removes it
        return Err(SeedError::Interrupted);
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
