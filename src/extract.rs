// 🔍 Field Extractor - Candidate trip fields from pasted receipt text
// One table-driven extractor; labels and unit markers are data, not branches.
// Advisory only: output is a draft for human review, never auto-committed.

use crate::fields::format_mdy;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

// ============================================================================
// CONFIDENCE
// ============================================================================

/// Reliability label for an extracted field. Informational only - never
/// gates persistence. Ordered so ties can be broken deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Frequency or position heuristic fallback
    Low,
    /// Structural position (known block, marked token)
    Med,
    /// Anchored to an explicit label or a known-list match
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Med => "med",
            Confidence::High => "high",
        }
    }
}

// ============================================================================
// EXTRACTED FIELD
// ============================================================================

/// An extracted field: either a value with its confidence, or nothing.
/// A field the extractor cannot locate is Absent, never a guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Field<T> {
    Present { value: T, confidence: Confidence },
    Absent,
}

impl<T> Field<T> {
    pub fn present(value: T, confidence: Confidence) -> Self {
        Field::Present { value, confidence }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Present { value, .. } => Some(value),
            Field::Absent => None,
        }
    }

    pub fn confidence(&self) -> Option<Confidence> {
        match self {
            Field::Present { confidence, .. } => Some(*confidence),
            Field::Absent => None,
        }
    }

    /// "high" / "med" / "low" / "absent"
    pub fn confidence_label(&self) -> &'static str {
        match self {
            Field::Present { confidence, .. } => confidence.as_str(),
            Field::Absent => "absent",
        }
    }
}

// ============================================================================
// PARSED DRAFT
// ============================================================================

/// Ephemeral candidate record. Lives only until the operator commits or
/// abandons the review form; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDraft {
    pub date: Field<NaiveDate>,
    pub dealer: Field<String>,
    pub pounds: Field<f64>,
    pub amount: Field<f64>,
    pub area: Field<String>,
}

impl ParsedDraft {
    /// Always five entries, one per field, even when everything is absent.
    pub fn confidences(&self) -> [(&'static str, &'static str); 5] {
        [
            ("date", self.date.confidence_label()),
            ("dealer", self.dealer.confidence_label()),
            ("pounds", self.pounds.confidence_label()),
            ("amount", self.amount.confidence_label()),
            ("area", self.area.confidence_label()),
        ]
    }

    /// Date rendered as MM/DD/YYYY for the review form.
    pub fn date_mdy(&self) -> Option<String> {
        self.date.value().map(|d| format_mdy(*d))
    }
}

// ============================================================================
// EXTRACTOR RULES (labels and markers as data)
// ============================================================================

/// The label/marker tables driving extraction. Dealer-specific quirks are
/// handled by extending these tables, not by adding code paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorRules {
    /// Tokens that anchor a date (e.g. "DATE")
    pub date_labels: Vec<String>,

    /// Tokens that must all appear in a window to anchor the amount
    pub amount_labels: Vec<String>,

    /// Currency markers for the second amount tier
    pub currency_symbols: Vec<String>,

    /// Weight-unit markers, including common transcription variants
    pub weight_markers: Vec<String>,

    /// Tokens that open a line-item description block
    pub description_labels: Vec<String>,

    /// Identifier noise: lines carrying these never yield amounts/pounds
    pub noise_markers: Vec<String>,

    /// Trade words that mark a line as a seller name
    pub seller_markers: Vec<String>,

    /// Trailing legal-entity suffixes that mark a seller line
    pub seller_suffixes: Vec<String>,

    /// Boilerplate tokens that disqualify a line as a dealer fallback
    pub boilerplate_markers: Vec<String>,

    /// Plausible amount range (inclusive)
    pub amount_range: (f64, f64),

    /// Plausible pounds range (inclusive)
    pub pounds_range: (f64, f64),

    /// Lines per window when hunting the labeled amount
    pub amount_window_lines: usize,

    /// Lines scanned below a description label
    pub description_window_lines: usize,

    /// Leading lines scanned for a seller-marked dealer line
    pub dealer_scan_lines: usize,

    /// Dealer fallback lines are truncated to this many chars
    pub dealer_max_len: usize,
}

impl Default for ExtractorRules {
    fn default() -> Self {
        let up = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        ExtractorRules {
            date_labels: up(&["DATE"]),
            amount_labels: up(&["CHECK", "AMOUNT"]),
            currency_symbols: up(&["$"]),
            weight_markers: up(&["LBS", "LB", "POUNDS", "POUND", "IBS", "1BS", "|BS"]),
            description_labels: up(&["DESCRIPTION"]),
            noise_markers: up(&["TEL", "PHONE", "ACCOUNT", "ROUTING", "PO BOX"]),
            seller_markers: up(&["SEAFOOD", "SHELLFISH", "FISHERIES", "LOBSTER", "CO-OP"]),
            seller_suffixes: up(&["INC", "LLC", "CO", "COMPANY", "CORP"]),
            boilerplate_markers: up(&["PAY TO", "DOLLARS", "MEMO", "VOID"]),
            amount_range: (1.0, 500_000.0),
            pounds_range: (1.0, 500.0),
            amount_window_lines: 4,
            description_window_lines: 12,
            dealer_scan_lines: 8,
            dealer_max_len: 40,
        }
    }
}

// ============================================================================
// FIXED TOKEN PATTERNS
// ============================================================================

// MM/DD/YYYY or MM-DD-YY with 2- or 4-digit year
static DATE_SEP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(0?[1-9]|1[0-2])[/\-.](0?[1-9]|[12][0-9]|3[01])[/\-.](\d{4}|\d{2})\b")
        .expect("date token pattern")
});

// Glued MMDD-YY / MMDDYY from careless transcription
static DATE_GLUED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(0[1-9]|1[0-2])([0-2][0-9]|3[01])[/\-]?([0-9]{2})\b")
        .expect("glued date pattern")
});

// 152.25 or 152,25
static MONEY_DEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]{1,6}[.,][0-9]{2})\b").expect("decimal money pattern")
});

// "152 25" - dollars and cents split by a transcription gap
static MONEY_SPACED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]{1,6})[ \t]+([0-9]{2})\b").expect("spaced money pattern")
});

// "152 0 0" - zeroed cents split apart
static MONEY_ZERO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]{1,6})[ \t]*0[ \t]*0\b").expect("zero-cents money pattern")
});

// Whole line is one decimal number (description block line item)
static LINE_DEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]{1,3}[.,][0-9]{1,2})\s*$").expect("line decimal pattern")
});

// Whole line is one bare integer
static LINE_INT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]{1,3})\s*$").expect("line integer pattern")
});

// Small numeric token for the pounds frequency fallback
static SMALL_NUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]{1,3}(?:[.,][0-9]{1,2})?)\b").expect("small number pattern")
});

// ============================================================================
// EXTRACTOR
// ============================================================================

pub struct Extractor {
    pub rules: ExtractorRules,
    weight_re: Regex,
    currency_re: Regex,
}

impl Extractor {
    /// Extractor with the default rule tables.
    pub fn new() -> Self {
        Self::from_rules(ExtractorRules::default()).expect("default extractor rules")
    }

    /// Build an extractor from a rule table (markers are escaped literals).
    pub fn from_rules(rules: ExtractorRules) -> Result<Self> {
        let units = rules
            .weight_markers
            .iter()
            .filter(|m| !m.is_empty())
            .map(|m| regex::escape(&m.to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");
        let weight_re = Regex::new(&format!(
            r"(?i)\b([0-9]+(?:[.,][0-9]+)?)\s*(?:{})\b",
            units
        ))
        .context("weight marker pattern")?;

        let symbols = rules
            .currency_symbols
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        let currency_re = Regex::new(&format!(
            r"(?:{})\s*([0-9]{{1,6}}(?:[.,][0-9]{{2}})?)\b",
            symbols
        ))
        .context("currency marker pattern")?;

        Ok(Extractor {
            rules,
            weight_re,
            currency_re,
        })
    }

    /// Load a rule table from JSON (quirk tables ship as data).
    pub fn from_rules_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read extractor rules: {:?}", path.as_ref()))?;
        let rules: ExtractorRules =
            serde_json::from_str(&content).context("Failed to parse extractor rules JSON")?;
        Self::from_rules(rules)
    }

    /// Extract a candidate draft from pasted text.
    ///
    /// Total: never fails, whatever the input. A field that cannot be
    /// located comes back Absent. The caller must put the draft in front
    /// of the operator before anything is persisted.
    pub fn extract(
        &self,
        text: &str,
        known_dealers: &[String],
        known_areas: &[String],
    ) -> ParsedDraft {
        let text_raw = text.replace('\r', "\n");
        let text_upper = text_raw.to_uppercase();
        let lines: Vec<String> = text_raw
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        let lines_upper: Vec<String> = lines.iter().map(|l| l.to_uppercase()).collect();

        let date = self.extract_date(&lines_upper);
        let dealer = self.extract_dealer(&text_upper, &lines, &lines_upper, known_dealers);
        let amount = self.extract_amount(&lines_upper);
        let pounds = self.extract_pounds(&text_raw, &lines_upper, amount.value().copied());
        let area = self.extract_area(&text_upper, known_areas);

        ParsedDraft {
            date,
            dealer,
            pounds,
            amount,
            area,
        }
    }

    // ------------------------------------------------------------------------
    // DATE
    // ------------------------------------------------------------------------

    fn extract_date(&self, lines_upper: &[String]) -> Field<NaiveDate> {
        let mut candidates = self.date_candidates(lines_upper, &DATE_SEP_RE);
        if candidates.is_empty() {
            // Glued MMDDYY only when no separated form exists at all
            candidates = self.date_candidates(lines_upper, &DATE_GLUED_RE);
        }

        // Highest score wins; ties break by first occurrence in scan order
        candidates
            .into_iter()
            .max_by(|a, b| {
                a.score
                    .cmp(&b.score)
                    .then(b.line.cmp(&a.line))
                    .then(b.start.cmp(&a.start))
            })
            .map(|c| {
                let confidence = if c.score > 0 {
                    Confidence::High
                } else {
                    Confidence::Med
                };
                Field::present(c.date, confidence)
            })
            .unwrap_or(Field::Absent)
    }

    fn date_candidates(&self, lines_upper: &[String], re: &Regex) -> Vec<DateCandidate> {
        let mut out = Vec::new();
        for (line_idx, line) in lines_upper.iter().enumerate() {
            for caps in re.captures_iter(line) {
                let (Some(m0), Some(mm), Some(dd), Some(yy)) =
                    (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
                else {
                    continue;
                };
                let Ok(month) = mm.as_str().parse::<u32>() else {
                    continue;
                };
                let Ok(day) = dd.as_str().parse::<u32>() else {
                    continue;
                };
                let Ok(raw_year) = yy.as_str().parse::<i32>() else {
                    continue;
                };
                let four_digit = yy.as_str().len() == 4;
                let year = if four_digit {
                    raw_year
                } else {
                    crate::fields::infer_century(raw_year)
                };
                if !(1900..=2100).contains(&year) {
                    continue;
                }
                let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                    continue;
                };
                let labeled = self
                    .rules
                    .date_labels
                    .iter()
                    .any(|lab| line[..m0.start()].contains(lab.as_str()));
                let score = if four_digit { 2 } else { 0 } + if labeled { 1 } else { 0 };
                out.push(DateCandidate {
                    date,
                    score,
                    line: line_idx,
                    start: m0.start(),
                });
            }
        }
        out
    }

    // ------------------------------------------------------------------------
    // AMOUNT
    // ------------------------------------------------------------------------

    fn extract_amount(&self, lines_upper: &[String]) -> Field<f64> {
        // Tier 1: money token following the amount labels, within a short
        // window of lines carrying all of them
        for i in 0..lines_upper.len() {
            let end = (i + self.rules.amount_window_lines).min(lines_upper.len());
            let window = lines_upper[i..end].join(" ");
            let anchored = self
                .rules
                .amount_labels
                .iter()
                .all(|lab| window.contains(lab.as_str()));
            if !anchored {
                continue;
            }
            // Only text after the labels counts; a figure ahead of the
            // label belongs to something else
            let mut after = 0usize;
            for lab in &self.rules.amount_labels {
                if let Some(pos) = window.find(lab.as_str()) {
                    after = after.max(pos + lab.len());
                }
            }
            if let Some(v) = money_from_window(&window[after..]) {
                return Field::present(v, Confidence::High);
            }
        }

        // Tier 2: value marked with a currency symbol
        for line in lines_upper {
            if let Some(caps) = self.currency_re.captures(line) {
                if let Some(v) = parse_num_token(&caps[1]) {
                    if self.in_amount_range(v) {
                        return Field::present(v, Confidence::Med);
                    }
                }
            }
        }

        // Tier 3: largest plausible decimal on identifier-free lines
        let mut best: Option<f64> = None;
        for line in lines_upper {
            if line.contains('/') || self.has_noise(line) {
                continue;
            }
            if let Some(caps) = MONEY_DEC_RE.captures(line) {
                if let Some(v) = parse_num_token(&caps[1]) {
                    if self.in_amount_range(v) && best.map_or(true, |b| v > b) {
                        best = Some(v);
                    }
                }
            }
        }
        match best {
            Some(v) => Field::present(v, Confidence::Low),
            None => Field::Absent,
        }
    }

    fn in_amount_range(&self, v: f64) -> bool {
        v >= self.rules.amount_range.0 && v <= self.rules.amount_range.1
    }

    // ------------------------------------------------------------------------
    // POUNDS
    // ------------------------------------------------------------------------

    fn extract_pounds(
        &self,
        text_raw: &str,
        lines_upper: &[String],
        amount: Option<f64>,
    ) -> Field<f64> {
        // Tier 1: value immediately followed by a weight-unit marker
        if let Some(caps) = self.weight_re.captures(text_raw) {
            if let Some(v) = parse_num_token(&caps[1]) {
                if v > 0.0 {
                    return Field::present(v, Confidence::High);
                }
            }
        }

        // Tier 2: standalone numeric line under a description label
        if let Some(idx) = lines_upper.iter().position(|l| {
            self.rules
                .description_labels
                .iter()
                .any(|lab| l.contains(lab.as_str()))
        }) {
            let end = (idx + self.rules.description_window_lines).min(lines_upper.len());
            let block = &lines_upper[idx..end];
            for line in block {
                if let Some(caps) = LINE_DEC_RE.captures(line) {
                    if let Some(v) = parse_num_token(&caps[1]) {
                        if v > 0.0 {
                            return Field::present(v, Confidence::High);
                        }
                    }
                }
            }
            for line in block {
                if let Some(caps) = LINE_INT_RE.captures(line) {
                    if let Some(v) = parse_num_token(&caps[1]) {
                        if self.in_pounds_range(v) {
                            return Field::present(v, Confidence::Med);
                        }
                    }
                }
            }
        }

        // Tier 3: most frequent plausible token on identifier-free lines,
        // never the value already claimed as the amount
        let mut tally: Vec<(String, f64, usize)> = Vec::new();
        for line in lines_upper {
            if self.has_noise(line) || self.has_amount_label(line) {
                continue;
            }
            for caps in SMALL_NUM_RE.captures_iter(line) {
                let Some(v) = parse_num_token(&caps[1]) else {
                    continue;
                };
                if !self.in_pounds_range(v) {
                    continue;
                }
                if let Some(a) = amount {
                    if (v - a).abs() < 0.005 {
                        continue;
                    }
                }
                let key = format!("{:.2}", v);
                match tally.iter_mut().find(|(k, _, _)| *k == key) {
                    Some(entry) => entry.2 += 1,
                    None => tally.push((key, v, 1)),
                }
            }
        }
        // First occurrence wins a frequency tie (tally keeps scan order)
        let mut best: Option<(f64, usize)> = None;
        for (_, v, count) in tally {
            match best {
                Some((_, c)) if count <= c => {}
                _ => best = Some((v, count)),
            }
        }
        match best {
            Some((v, _)) => Field::present(v, Confidence::Low),
            None => Field::Absent,
        }
    }

    fn in_pounds_range(&self, v: f64) -> bool {
        v >= self.rules.pounds_range.0 && v <= self.rules.pounds_range.1
    }

    fn has_noise(&self, line_upper: &str) -> bool {
        self.rules
            .noise_markers
            .iter()
            .any(|m| line_upper.contains(m.as_str()))
    }

    fn has_amount_label(&self, line_upper: &str) -> bool {
        self.rules
            .amount_labels
            .iter()
            .any(|m| line_upper.contains(m.as_str()))
    }

    // ------------------------------------------------------------------------
    // DEALER
    // ------------------------------------------------------------------------

    fn extract_dealer(
        &self,
        text_upper: &str,
        lines: &[String],
        lines_upper: &[String],
        known_dealers: &[String],
    ) -> Field<String> {
        // Tier 1: longest exact match against the known-dealer list
        let mut best: Option<&String> = None;
        for dealer in known_dealers {
            let needle = dealer.trim().to_uppercase();
            if needle.is_empty() || !text_upper.contains(&needle) {
                continue;
            }
            if best.map_or(true, |b| dealer.len() > b.len()) {
                best = Some(dealer);
            }
        }
        if let Some(dealer) = best {
            return Field::present(dealer.clone(), Confidence::High);
        }

        // Tier 2: first leading line bearing a seller marker
        let scan = self.rules.dealer_scan_lines.min(lines.len());
        for (line, line_upper) in lines[..scan].iter().zip(&lines_upper[..scan]) {
            if self.is_seller_line(line_upper) {
                return Field::present(self.truncate_dealer(line), Confidence::Med);
            }
        }

        // Tier 3: first sufficiently alphabetic, non-boilerplate line
        for (line, line_upper) in lines.iter().zip(lines_upper) {
            if self.is_boilerplate(line_upper) {
                continue;
            }
            let visible: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            let alpha = visible.iter().filter(|c| c.is_alphabetic()).count();
            if alpha >= 3 && alpha * 10 >= visible.len() * 6 {
                return Field::present(self.truncate_dealer(line), Confidence::Low);
            }
        }

        Field::Absent
    }

    fn is_seller_line(&self, line_upper: &str) -> bool {
        if self
            .rules
            .seller_markers
            .iter()
            .any(|m| line_upper.contains(m.as_str()))
        {
            return true;
        }
        let Some(last) = line_upper.split_whitespace().last() else {
            return false;
        };
        let bare = last.trim_end_matches(|c: char| c == '.' || c == ',');
        self.rules.seller_suffixes.iter().any(|s| s == bare)
    }

    fn is_boilerplate(&self, line_upper: &str) -> bool {
        let tables = [
            &self.rules.amount_labels,
            &self.rules.date_labels,
            &self.rules.description_labels,
            &self.rules.noise_markers,
            &self.rules.boilerplate_markers,
        ];
        tables
            .iter()
            .any(|t| t.iter().any(|m| line_upper.contains(m.as_str())))
    }

    fn truncate_dealer(&self, line: &str) -> String {
        line.chars()
            .take(self.rules.dealer_max_len)
            .collect::<String>()
            .trim()
            .to_string()
    }

    // ------------------------------------------------------------------------
    // AREA
    // ------------------------------------------------------------------------

    fn extract_area(&self, text_upper: &str, known_areas: &[String]) -> Field<String> {
        for area in known_areas {
            let needle = area.trim().to_uppercase();
            if !needle.is_empty() && text_upper.contains(&needle) {
                return Field::present(area.clone(), Confidence::Med);
            }
        }
        Field::Absent
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

struct DateCandidate {
    date: NaiveDate,
    score: i32,
    line: usize,
    start: usize,
}

// ============================================================================
// TOKEN HELPERS
// ============================================================================

/// Money token from a label-anchored window, tolerating transcription
/// artifacts: O/C misread as zero, cents split off by whitespace.
fn money_from_window(window: &str) -> Option<f64> {
    let w: String = window
        .chars()
        .map(|c| if matches!(c, 'o' | 'O' | 'c' | 'C') { '0' } else { c })
        .collect();
    if let Some(caps) = MONEY_DEC_RE.captures(&w) {
        if let Some(v) = parse_num_token(&caps[1]) {
            return Some(v);
        }
    }
    if let Some(caps) = MONEY_SPACED_RE.captures(&w) {
        if let Ok(v) = format!("{}.{}", &caps[1], &caps[2]).parse::<f64>() {
            return Some(v);
        }
    }
    if let Some(caps) = MONEY_ZERO_RE.captures(&w) {
        if let Ok(v) = caps[1].parse::<f64>() {
            return Some(v);
        }
    }
    None
}

/// Digit token to f64, accepting a comma decimal separator.
fn parse_num_token(token: &str) -> Option<f64> {
    token.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

// ============================================================================
// TESTS
// ============================================================================
