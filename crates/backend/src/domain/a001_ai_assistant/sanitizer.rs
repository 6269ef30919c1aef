//! Очистка ответов LLM: удаление ссылок на источники и лёгкая Markdown-разметка.
//!
//! Шаги выполняются строго по порядку, каждый следующий рассчитывает на
//! результат предыдущего:
//! 1. ссылки `[1]`, `[23]`, `[source]`
//! 2. фразы-оговорки ("based on the search results" и т.п.)
//! 3. нормализация пробелов и висячей пунктуации
//! 4. разбиение длинных абзацев на группы предложений
//! 5. структурная разметка (метки списков, `Label:`, заголовки)
//! 6. выделение финансовых терминов
//! 7. единый маркер списков `* `

use once_cell::sync::Lazy;
use regex::Regex;

/// Максимальная длина абзаца до разбиения на группы предложений
pub const MAX_PARAGRAPH_CHARS: usize = 150;

/// Термины, выделяемые жирным. Составные термины идут раньше, чтобы
/// альтернатива в регулярном выражении предпочитала более длинное совпадение.
pub const FINANCIAL_TERMS: &[&str] = &[
    "accounts receivable",
    "accounts payable",
    "income statement",
    "balance sheet",
    "reconciliation",
    "amortization",
    "depreciation",
    "discrepancy",
    "cash flow",
    "inventory",
    "liability",
    "forecast",
    "revenue",
    "expense",
    "journal",
    "accrual",
    "payroll",
    "profit",
    "margin",
    "equity",
    "ledger",
    "budget",
    "asset",
    "audit",
    "tax",
];

static CITATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(?:\d+|source)\]").expect("citation regex"));

static DISCLAIMER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:based on(?: the)? search results|according to(?: the)? information provided|based on(?: the)? available information),?",
    )
    .expect("disclaimer regex")
});

static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("space regex"));
static TRAILING_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+\n").expect("trailing space regex"));
static LEADING_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]+").expect("leading space regex"));
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank run regex"));
static ORPHAN_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+([.,:])").expect("punctuation regex"));

static NUMBERED_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*\d+\.[ \t]+)([^:\n*]+):([ \t]+)").expect("numbered label regex")
});
static STANDALONE_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([A-Za-z][A-Za-z ]*):([ \t]+)").expect("standalone label regex")
});
static HEADING_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,3})([^#\s])").expect("heading space regex"));
static INLINE_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\n#])[ \t]+(#{1,3}[ \t])").expect("inline heading regex"));

static TERM_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = FINANCIAL_TERMS
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("financial terms regex")
});

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*][ \t]+(.+)$").expect("bullet regex"));

/// Полный проход очистки. Чистая функция, не паникует; пустой ввод
/// возвращается как есть.
pub fn sanitize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = strip_markers(raw);
    let text = normalize_whitespace(&text);
    let text = reflow_paragraphs(&text);
    let text = normalize_structure(&text);
    let text = emphasize_terms(&text);
    normalize_bullets(&text)
}

/// Удаление ссылок и оговорок повторяется, пока текст меняется:
/// вырезанный маркер может склеить новый из окружающего текста (`[[1]1]`).
fn strip_markers(raw: &str) -> String {
    let mut text = raw.to_string();
    loop {
        let next = strip_disclaimers(&strip_citations(&text));
        if next == text {
            return text;
        }
        text = next;
    }
}

pub fn strip_citations(text: &str) -> String {
    CITATION_RE.replace_all(text, "").into_owned()
}

pub fn strip_disclaimers(text: &str) -> String {
    DISCLAIMER_RE.replace_all(text, "").into_owned()
}

/// Схлопывает пробелы внутри строк, но сохраняет пустые строки между
/// абзацами (не более одной подряд).
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = SPACE_RUN_RE.replace_all(&text, " ");
    let text = TRAILING_SPACE_RE.replace_all(&text, "\n");
    let text = LEADING_SPACE_RE.replace_all(&text, "");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    let text = ORPHAN_PUNCT_RE.replace_all(&text, "$1");
    text.trim().to_string()
}

pub fn reflow_paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|para| {
            if is_structured(para) || para.chars().count() <= MAX_PARAGRAPH_CHARS {
                para.to_string()
            } else {
                chunk_sentences(para)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Абзац уже оформлен как список или заголовок
fn is_structured(para: &str) -> bool {
    para.starts_with('-') || para.starts_with('*') || para.starts_with('#') || para.starts_with("1.")
}

/// Группирует предложения в куски не длиннее `MAX_PARAGRAPH_CHARS`.
/// Одно предложение длиннее лимита остаётся целым.
fn chunk_sentences(para: &str) -> String {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(para) {
        let current_len = current.chars().count();
        if current_len > 0 && current_len + sentence.chars().count() > MAX_PARAGRAPH_CHARS {
            chunks.push(current.trim().to_string());
            current.clear();
        }
        current.push_str(sentence);
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks.join("\n\n")
}

/// Предложение заканчивается серией `.`, `!`, `?`, за которой идёт пробел.
/// Хвост без завершающего знака считается последним предложением.
fn split_sentences(para: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut after_terminator = false;

    for (i, ch) in para.char_indices() {
        let is_terminator = matches!(ch, '.' | '!' | '?');
        if after_terminator && !is_terminator && ch.is_whitespace() {
            sentences.push(&para[start..i]);
            start = i;
        }
        after_terminator = is_terminator;
    }

    if start < para.len() {
        sentences.push(&para[start..]);
    }
    sentences
}

pub fn normalize_structure(text: &str) -> String {
    let text = NUMBERED_LABEL_RE.replace_all(text, "${1}**${2}:**${3}");
    let text = STANDALONE_LABEL_RE.replace_all(&text, "**${1}:**${2}");
    let text = HEADING_SPACE_RE.replace_all(&text, "${1} ${2}");
    let text = INLINE_HEADING_RE.replace_all(&text, "${1}\n${2}");
    isolate_headings(&text)
}

fn is_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=3).contains(&hashes) && line[hashes..].starts_with([' ', '\t'])
}

/// Пустая строка до и после каждого заголовка
fn isolate_headings(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let heading = is_heading(line);
        if heading && out.last().is_some_and(|prev| !prev.trim().is_empty()) {
            out.push("");
        }
        out.push(line);
        if heading && lines.get(i + 1).is_some_and(|next| !next.trim().is_empty()) {
            out.push("");
        }
    }

    out.join("\n")
}

/// Оборачивает термины в `**…**`, пропуская уже выделенные участки.
/// Чётные сегменты между маркерами `**` лежат вне выделения.
pub fn emphasize_terms(text: &str) -> String {
    text.split("**")
        .enumerate()
        .map(|(i, segment)| {
            if i % 2 == 0 {
                TERM_RE.replace_all(segment, "**${0}**").into_owned()
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("**")
}

pub fn normalize_bullets(text: &str) -> String {
    BULLET_RE.replace_all(text, "* ${1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citations_removed_in_any_case() {
        let out = sanitize("Cash is king [1]. Keep records [23] [Source] and [SOURCE].");
        assert!(!out.contains('['), "got: {out}");
        assert_eq!(out, "Cash is king. Keep records and.");
    }

    #[test]
    fn test_removal_passes_are_idempotent() {
        let raw = "Based on the search results, sales rose [2]. According to information provided, costs fell [source].";
        let once = sanitize(raw);
        let twice = sanitize(&once);
        assert!(!CITATION_RE.is_match(&once));
        assert_eq!(strip_citations(&once), once);
        assert_eq!(strip_disclaimers(&once), once);
        assert!(!CITATION_RE.is_match(&twice));
    }

    #[test]
    fn test_nested_markers_do_not_reassemble() {
        for raw in [
            "Cash rose [[1]1].",
            "Cash rose [sour[2]ce].",
            "Cash rose [based on the search results7].",
        ] {
            let once = sanitize(raw);
            assert!(!CITATION_RE.is_match(&once), "citation left in {once:?}");
            assert_eq!(strip_citations(&once), once);
            assert_eq!(once, "Cash rose.");
        }
    }

    #[test]
    fn test_disclaimers_removed() {
        assert_eq!(
            sanitize("Based on the search results, your margin improved."),
            "your **margin** improved."
        );
        assert_eq!(
            sanitize("Sales are flat based on available information."),
            "Sales are flat."
        );
    }

    #[test]
    fn test_orphan_punctuation_and_space_runs() {
        assert_eq!(
            normalize_whitespace("Cash   is up  .\n\n\n\nNext , please :  go"),
            "Cash is up.\n\nNext, please: go"
        );
    }

    #[test]
    fn test_long_paragraph_is_chunked() {
        let sentence = "Keep every receipt from the week in one place so nothing is lost. ";
        let para = sentence.repeat(6);
        let out = reflow_paragraphs(para.trim());
        let chunks: Vec<&str> = out.split("\n\n").collect();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MAX_PARAGRAPH_CHARS, "chunk too long: {chunk}");
        }
        assert_eq!(chunks.join(" "), para.trim());
    }

    #[test]
    fn test_single_long_sentence_stays_whole() {
        let long = format!("{}.", "word ".repeat(40).trim());
        let para = format!("{} Short one.", long);
        let out = reflow_paragraphs(&para);
        assert_eq!(out, format!("{}\n\nShort one.", long));
    }

    #[test]
    fn test_unterminated_tail_is_kept() {
        let para = format!("{} And then the tail", "First sentence is here. ".repeat(7).trim());
        let out = reflow_paragraphs(&para);
        assert!(out.ends_with("And then the tail"));
    }

    #[test]
    fn test_structured_paragraph_passes_through() {
        let list = format!("- {}", "item text ".repeat(30).trim());
        assert_eq!(reflow_paragraphs(&list), list);
    }

    #[test]
    fn test_heading_and_numbered_paragraphs_pass_through() {
        let heading = format!("# {}", "Quarter overview. ".repeat(12).trim());
        assert!(heading.chars().count() > MAX_PARAGRAPH_CHARS);
        assert_eq!(reflow_paragraphs(&heading), heading);

        let numbered = format!("1. {}", "Match the deposit slips. ".repeat(8).trim());
        assert!(numbered.chars().count() > MAX_PARAGRAPH_CHARS);
        assert_eq!(reflow_paragraphs(&numbered), numbered);
    }

    #[test]
    fn test_labels_are_bolded() {
        assert_eq!(
            normalize_structure("1. Cash position: strong\n2. Outlook: stable"),
            "1. **Cash position:** strong\n2. **Outlook:** stable"
        );
        assert_eq!(normalize_structure("Summary: all good"), "**Summary:** all good");
        assert_eq!(
            normalize_structure("1. **Cash position:** strong"),
            "1. **Cash position:** strong"
        );
    }

    #[test]
    fn test_headings_get_space_and_blank_lines() {
        assert_eq!(
            normalize_structure("Intro text\n##Overview\nMore text"),
            "Intro text\n\n## Overview\n\nMore text"
        );
        assert_eq!(normalize_structure("#### Too deep"), "#### Too deep");
    }

    #[test]
    fn test_terms_bolded_outside_existing_bold() {
        assert_eq!(
            emphasize_terms("Your revenue and Cash Flow look good"),
            "Your **revenue** and **Cash Flow** look good"
        );
        assert_eq!(
            emphasize_terms("**Quarterly revenue** grew, and so did profit"),
            "**Quarterly revenue** grew, and so did **profit**"
        );
        assert_eq!(emphasize_terms("Expenses and taxes"), "Expenses and taxes");
        assert_eq!(
            emphasize_terms("Check accounts payable"),
            "Check **accounts payable**"
        );
    }

    #[test]
    fn test_bullets_normalized() {
        assert_eq!(
            normalize_bullets("- first\n  * second\n-third"),
            "* first\n* second\n-third"
        );
    }

    #[test]
    fn test_full_pipeline() {
        let raw = "##Summary\nBased on the search results, here is the plan [1].\n\n- Review the ledger\n- Update the forecast";
        assert_eq!(
            sanitize(raw),
            "## Summary\n\nhere is the plan.\n\n* Review the **ledger**\n* Update the **forecast**"
        );
    }

    #[test]
    fn test_empty_input_unchanged() {
        assert_eq!(sanitize(""), "");
    }
}
