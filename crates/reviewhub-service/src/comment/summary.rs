//! Change message text recorded when comments are published.

/// Compose the summary message for a publication on patch set `patch_set`.
///
/// Vote deltas produce a first line `Patch Set <n>: <d1>; <d2>` terminated by
/// a newline; the reviewer's free text follows verbatim. An empty result
/// means no message is recorded.
pub fn compose_summary(patch_set: i32, deltas: &[String], text: Option<&str>) -> String {
    let mut buf = String::new();
    if !deltas.is_empty() {
        buf.push_str(&format!("Patch Set {patch_set}: {}\n", deltas.join("; ")));
    }
    if let Some(text) = text {
        buf.push_str(text);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deltas(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_deltas_and_text() {
        let summary = compose_summary(
            3,
            &deltas(&["Verified", "Looks good to me, approved"]),
            Some("Nice work"),
        );
        assert_eq!(
            summary,
            "Patch Set 3: Verified; Looks good to me, approved\nNice work"
        );
    }

    #[test]
    fn test_deltas_only() {
        assert_eq!(
            compose_summary(1, &deltas(&["Fails"]), None),
            "Patch Set 1: Fails\n"
        );
    }

    #[test]
    fn test_text_only_is_verbatim() {
        assert_eq!(compose_summary(2, &[], Some("  see inline\n")), "  see inline\n");
    }

    #[test]
    fn test_nothing_to_say() {
        assert!(compose_summary(2, &[], None).is_empty());
        assert!(compose_summary(2, &[], Some("")).is_empty());
    }
}
