//! Candidate ranking policy.
//!
//! Strict priority order:
//! 1. first candidate whose title contains "official" (case-insensitive)
//! 2. else first candidate whose title or description contains "remaster"
//! 3. else the first candidate in backend order
//! 4. nothing for an empty list

use crate::model::VideoCandidate;

const OFFICIAL: &str = "official";
const REMASTER: &str = "remaster";

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn is_official(candidate: &VideoCandidate) -> bool {
    contains_ignore_case(&candidate.title, OFFICIAL)
}

fn is_remaster(candidate: &VideoCandidate) -> bool {
    contains_ignore_case(&candidate.title, REMASTER)
        || candidate
            .description
            .as_deref()
            .is_some_and(|d| contains_ignore_case(d, REMASTER))
}

/// Pick the best candidate from a search result list.
pub fn pick_candidate(candidates: Vec<VideoCandidate>) -> Option<VideoCandidate> {
    let index = candidates
        .iter()
        .position(is_official)
        .or_else(|| candidates.iter().position(is_remaster))
        .or_else(|| (!candidates.is_empty()).then_some(0))?;

    candidates.into_iter().nth(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn titles(titles: &[&str]) -> Vec<VideoCandidate> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| VideoCandidate::new(format!("https://video.test/{}", i), *t))
            .collect()
    }

    #[test]
    fn test_official_beats_remaster() {
        let picked = pick_candidate(titles(&["X Remaster", "Y Official Video", "Z"])).unwrap();
        assert_eq!(picked.title, "Y Official Video");
    }

    #[test]
    fn test_remaster_without_official() {
        let picked = pick_candidate(titles(&["A Remaster"])).unwrap();
        assert_eq!(picked.title, "A Remaster");
    }

    #[test]
    fn test_fallback_to_first() {
        let picked = pick_candidate(titles(&["Plain Title"])).unwrap();
        assert_eq!(picked.title, "Plain Title");
    }

    #[test]
    fn test_empty_is_none() {
        assert!(pick_candidate(vec![]).is_none());
    }

    #[test]
    fn test_official_is_case_insensitive_and_first_wins() {
        let picked = pick_candidate(titles(&["live", "OFFICIAL audio", "Official Video"])).unwrap();
        assert_eq!(picked.title, "OFFICIAL audio");
    }

    #[test]
    fn test_remaster_in_description() {
        let mut candidates = titles(&["Live at Wembley", "Album Version"]);
        candidates[1].description = Some("2011 Remastered edition".to_string());

        let picked = pick_candidate(candidates).unwrap();
        assert_eq!(picked.title, "Album Version");
    }

    #[test]
    fn test_official_in_description_does_not_count() {
        let mut candidates = titles(&["Fan upload", "Cover version"]);
        candidates[1].description = Some("not the official video".to_string());

        let picked = pick_candidate(candidates).unwrap();
        assert_eq!(picked.title, "Fan upload");
    }

    proptest! {
        #[test]
        fn prop_nonempty_always_picks_member(names in proptest::collection::vec("[a-zA-Z ]{0,20}", 1..8)) {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let candidates = titles(&refs);
            let picked = pick_candidate(candidates.clone());
            prop_assert!(picked.is_some());
            prop_assert!(candidates.contains(&picked.unwrap()));
        }

        #[test]
        fn prop_official_always_wins(
            before in proptest::collection::vec("[a-np-z ]{0,12}", 0..5),
            after in proptest::collection::vec("[a-np-z ]{0,12}", 0..5),
        ) {
            // no 'o' in generated titles, so only the planted entry is official
            let mut names = before.clone();
            let official_index = names.len();
            names.push("Official Video".to_string());
            names.extend(after);

            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let picked = pick_candidate(titles(&refs)).unwrap();
            prop_assert_eq!(picked.url, format!("https://video.test/{}", official_index));
        }
    }
}
