/// Longest symbol accepted after sanitizing.
pub const MAX_TICKER_LEN: usize = 20;

/// Keeps the characters Yahoo symbols use (`RELIANCE.NS`, `^NSEI`, `BRK-B`,
/// `INR=X`), upper-cased. Length is checked by the caller against
/// [`MAX_TICKER_LEN`].
pub fn sanitize_ticker(ticker: String) -> String {
    return ticker
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '^' | '='))
        .collect::<String>()
        .to_uppercase();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_ticker_pass_no_harm() {
        let result = sanitize_ticker("TCS.NS".to_string());
        assert_eq!(result, "TCS.NS".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_delimiters() {
        let result = sanitize_ticker("^NSEI-_=X".to_string());
        assert_eq!(result, "^NSEI-_=X".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_remove_unsafe() {
        let result = sanitize_ticker("AAPL&period=1/../..".to_string());
        assert_eq!(result, "AAPLPERIOD=1....".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_remove_non_ascii() {
        let result = sanitize_ticker("ТCS ns".to_string());
        assert_eq!(result, "CSNS".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_no_truncation() {
        let result = sanitize_ticker("123123123123123123123".to_string());
        assert_eq!(result, "123123123123123123123".to_string());
        assert!(result.len() > MAX_TICKER_LEN);
    }

    #[test]
    fn sanitize_ticker_pass_to_uppercase() {
        let result = sanitize_ticker("reliance.ns".to_string());
        assert_eq!(result, "RELIANCE.NS".to_string());
    }

    #[test]
    fn sanitize_ticker_pass_empty_when_nothing_left() {
        let result = sanitize_ticker("/*!@#".to_string());
        assert!(result.is_empty());
    }
}
