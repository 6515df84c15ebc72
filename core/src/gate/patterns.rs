use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Dangerous-command signatures. Pattern matching, not a shell parser:
    /// false positives are expected and escapable via the bypass flag.
    static ref SIGNATURES: Vec<(Regex, &'static str)> = vec![
        (
            Regex::new(r"\brm\s+(-[a-zA-Z]*[rf][a-zA-Z]*\s+)+(/\s|/$|/\*|--no-preserve-root)")
                .unwrap(),
            "recursive filesystem delete",
        ),
        (
            Regex::new(r"\bmkfs(\.[a-z0-9]+)?\b").unwrap(),
            "filesystem format",
        ),
        (
            Regex::new(r"\bdd\s+[^|;]*of=/dev/").unwrap(),
            "raw device write",
        ),
        (
            Regex::new(r":\(\)\s*\{\s*:\|:&\s*\}\s*;\s*:").unwrap(),
            "fork bomb",
        ),
        (
            Regex::new(r">\s*/dev/(sd|hd|nvme|mmcblk)").unwrap(),
            "device overwrite",
        ),
        (
            Regex::new(r"(;|&&|\|\|)\s*(rm\s+-[a-zA-Z]*[rf]|mkfs|shutdown|reboot|halt|poweroff)\b")
                .unwrap(),
            "chained destructive command",
        ),
        (
            Regex::new(r"\bchmod\s+(-[a-zA-Z]+\s+)*777\s+/(\s|$)").unwrap(),
            "world-writable root",
        ),
        (
            Regex::new(r"\b(curl|wget)\b[^|;]*\|\s*(ba|z|da)?sh\b").unwrap(),
            "pipe to shell",
        ),
        (
            Regex::new(r"\b(shutdown|reboot|halt|poweroff)\b\s*$").unwrap(),
            "host shutdown",
        ),
    ];
}

/// Returns the label of the first matching dangerous signature, if any.
pub fn match_dangerous(command: &str) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(re, _)| re.is_match(command))
        .map(|(_, label)| *label)
}
