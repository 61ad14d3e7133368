#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParseError {
    pub(crate) index: usize,
}

/// Splits on whitespace; single or double quotes keep spaces inside one argument.
pub(crate) fn parse_args(input: &str) -> Result<Vec<String>, ParseError> {
    if let Some((index, _)) = input.char_indices().find(|(_, ch)| ch.is_control()) {
        return Err(ParseError { index });
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_item = false;
    let mut quote: Option<char> = None;
    let mut open_index = 0usize;
    for (index, ch) in input.char_indices() {
        if let Some(active) = quote {
            if ch == active {
                quote = None;
            } else {
                current.push(ch);
            }
            continue;
        }

        if ch == '"' || ch == '\'' {
            quote = Some(ch);
            open_index = index;
            in_item = true;
            continue;
        }

        if ch.is_whitespace() {
            if in_item {
                items.push(std::mem::take(&mut current));
                in_item = false;
            }
            continue;
        }

        current.push(ch);
        in_item = true;
    }

    if quote.is_some() {
        return Err(ParseError { index: open_index });
    }
    if in_item {
        items.push(current);
    }
    Ok(items)
}

/// 1-based hole number from the user to a 0-based index.
pub(crate) fn parse_hole(token: &str) -> Option<usize> {
    token.parse::<usize>().ok()?.checked_sub(1)
}

pub(crate) fn format_parse_error(input: &str, index: usize) -> String {
    let caret_pos = input
        .char_indices()
        .take_while(|(byte_idx, _)| *byte_idx < index)
        .count();
    format!(
        "Invalid character at position {}:\n{}\n{}^",
        caret_pos + 1,
        input,
        " ".repeat(caret_pos)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_names_stay_together() {
        let args = parse_args(r#"score "Ann Marie" 3 4"#).unwrap();
        assert_eq!(args, vec!["score", "Ann Marie", "3", "4"]);
    }

    #[test]
    fn empty_quotes_are_an_argument() {
        let args = parse_args(r#"score Ann 3 """#).unwrap();
        assert_eq!(args, vec!["score", "Ann", "3", ""]);
    }

    #[test]
    fn unbalanced_quote_points_at_opening() {
        assert_eq!(parse_args("add 'Ann"), Err(ParseError { index: 4 }));
        assert_eq!(
            format_parse_error("add 'Ann", 4),
            "Invalid character at position 5:\nadd 'Ann\n    ^"
        );
    }

    #[test]
    fn holes_are_one_based() {
        assert_eq!(parse_hole("1"), Some(0));
        assert_eq!(parse_hole("0"), None);
        assert_eq!(parse_hole("x"), None);
    }
}
