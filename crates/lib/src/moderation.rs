//! Denylist matching and the moderation action (delete file + notify uploader).

use crate::slack::SlackClient;

/// Trigger words checked against recognized text, lowercase, diacritic and
/// ASCII spellings both listed. Fixed at compile time; never mutated.
pub const DENYLIST: &[&str] = &[
    "cafea",
    "cafeluță",
    "cafeluta",
    "savurăm",
    "savuram",
    "savurați",
    "savurati",
    "savurează",
    "savureaza",
    "dimineață",
    "dimineata",
    "dimineața",
    "savoare",
    "savuros",
    "savuroasă",
    "savuroasa",
    "minunat",
    "minunată",
    "minunata",
];

/// Message sent to the uploader after their file is removed.
pub const NOTIFY_TEXT: &str = "https://youtu.be/l60MnDJklnM";

/// First denylist entry contained in the text (case-insensitive substring
/// match), or None. Empty text never matches.
pub fn find_match(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    DENYLIST.iter().copied().find(|word| lowered.contains(word))
}

/// Check recognized text against the denylist and, on a match, delete the
/// file and notify the uploader. Both calls are fire-and-forget: outcomes are
/// logged, a failure in one does not skip or roll back the other.
pub async fn apply(slack: &SlackClient, file_id: &str, user_id: &str, text: &str) {
    let Some(word) = find_match(text) else {
        log::debug!("file {}: recognized text matched nothing", file_id);
        return;
    };
    log::info!("file {}: matched denylist entry {:?}", file_id, word);
    match slack.delete_file(file_id).await {
        Ok(()) => log::info!("file {}: deleted", file_id),
        Err(e) => log::warn!("file {}: files.delete failed: {}", file_id, e),
    }
    match slack.post_message(user_id, NOTIFY_TEXT).await {
        Ok(()) => log::info!("file {}: uploader {} notified", file_id, user_id),
        Err(e) => log::warn!("file {}: chat.postMessage to {} failed: {}", file_id, user_id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_substring_case_insensitive() {
        assert_eq!(find_match("O cafea buna dimineata"), Some("cafea"));
        assert_eq!(find_match("CAFEA PROASPATA"), Some("cafea"));
        assert_eq!(find_match("Savurează momentul"), Some("savurează"));
    }

    #[test]
    fn matches_inside_longer_words() {
        assert_eq!(find_match("cafeaua de azi"), Some("cafea"));
        assert_eq!(find_match("o cafeluta mica"), Some("cafeluta"));
    }

    #[test]
    fn diacritic_spellings_match() {
        assert_eq!(find_match("Bună dimineața!"), Some("dimineața"));
        assert_eq!(find_match("buna dimineata"), Some("dimineata"));
    }

    #[test]
    fn empty_and_clean_text_do_not_match() {
        assert_eq!(find_match(""), None);
        assert_eq!(find_match("quarterly report attached"), None);
    }

    #[test]
    fn denylist_entries_are_lowercase() {
        for word in DENYLIST {
            assert_eq!(*word, word.to_lowercase(), "entry {:?} must be lowercase", word);
        }
    }
}
