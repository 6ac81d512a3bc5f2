use crate::classify::PhraseSet;
use crate::model::SplitCandidate;

/// System context sent alongside the batch prompt.
pub(crate) const SYSTEM_PROMPT: &str = "You classify corporate actions. \
     Answer with exactly one line per ticker in the requested format and nothing else.";

/// One batch request: the prompt text plus the tickers in presentation order.
///
/// The ticker list is used for default-filling and validation only; the
/// parser never relies on line positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPrompt {
    pub text: String,
    pub tickers: Vec<String>,
}

/// Build the batch prompt; `None` when there is nothing to send.
pub fn build_prompt(candidates: &[SplitCandidate], phrases: &PhraseSet) -> Option<BatchPrompt> {
    if candidates.is_empty() {
        return None;
    }

    let [(_, round_up), (_, cash), (_, unknown)] = phrases.entries();
    let mut text = format!(
        "Decide how fractional shares are likely to be handled for each of the REVERSE stock \
         splits listed below: rounded up to a whole share, or paid out as cash in lieu.\n\n\
         Look for the company's own filings (8-K, proxy statements), exchange notices, press \
         releases and reputable financial news about this specific split.\n\n\
         Answer with exactly one of these phrases, written character-for-character:\n\
         - {round_up}: the evidence says fractional shares will be rounded up.\n\
         - {cash}: the evidence says cash will be paid, or there is no sign of rounding up.\n\
         - {unknown}: sources conflict or there is too little information.\n\n\
         Response format, one line per ticker, no numbering, no extra text:\n\
         TICKER: <phrase> | Reasoning: <one sentence naming the key evidence>\n\n\
         Example:\n\
         XYZ: {cash} | Reasoning: The 8-K says nothing about rounding, so cash handling is the default.\n\
         ABC: {round_up} | Reasoning: The press release states fractions will be rounded up to the next whole share.\n\n\
         Reverse splits:\n"
    );

    let mut tickers = Vec::with_capacity(candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} (Ratio: {}, Ex-Date: {}, Year: {})\n",
            i + 1,
            candidate.ticker,
            candidate.ratio,
            candidate.ex_date,
            candidate.year()
        ));
        tickers.push(candidate.ticker.clone());
    }
    let trimmed_len = text.trim_end().len();
    text.truncate(trimmed_len);

    Some(BatchPrompt { text, tickers })
}
