//! (listfile) parsing and generation

/// Parse a (listfile) into individual filenames.
///
/// Lines are separated by CRLF (LF alone is accepted too), surrounding
/// whitespace is trimmed and empty lines are skipped.
pub fn parse_listfile(data: &[u8]) -> Vec<String> {
    let content = String::from_utf8_lossy(data);
    if let std::borrow::Cow::Owned(_) = content {
        log::warn!("(listfile) contains invalid UTF-8, using lossy conversion");
    }

    let files: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    log::debug!("Parsed {} files from (listfile)", files.len());
    files
}

/// Build (listfile) content from file names, joined with CRLF
pub fn build_listfile<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\r\n")
}
