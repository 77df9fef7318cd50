use tracing::error;
use url::Url;

use super::session::AccessToken;
use crate::errors::ControlError;

/// Redirect parameter carrying the token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Redirect parameter explaining a refused authorization.
pub const ERROR_DESCRIPTION_KEY: &str = "error_description";

/// Extracts the access token from the redirect URL the streaming app calls
/// back with.
///
/// Both the query and the fragment are searched; the query wins. An empty
/// value counts as missing.
pub fn parse_access_token(redirect_url: &str) -> Result<AccessToken, ControlError> {
    let url = Url::parse(redirect_url).map_err(|e| {
        error!("Failed to parse redirect URL: {}", e);
        ControlError::RedirectParse(format!("malformed URL: {e}"))
    })?;

    if let Some(token) = find_parameter(&url, ACCESS_TOKEN_KEY).filter(|t| !t.is_empty()) {
        return Ok(AccessToken::new(token));
    }

    let message = match find_parameter(&url, ERROR_DESCRIPTION_KEY) {
        Some(description) => format!("no {ACCESS_TOKEN_KEY} parameter ({description})"),
        None => format!("no {ACCESS_TOKEN_KEY} parameter"),
    };
    error!("Failed to parse access token from redirect URL: {}", message);
    Err(ControlError::RedirectParse(message))
}

fn find_parameter(url: &Url, key: &str) -> Option<String> {
    let from_query = url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned());

    from_query.or_else(|| {
        url.fragment().and_then(|fragment| {
            url::form_urlencoded::parse(fragment.as_bytes())
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_fragment() {
        let token =
            parse_access_token("controlkit://callback#access_token=abc123&token_type=Bearer")
                .unwrap();
        assert_eq!(token.expose(), "abc123");
    }

    #[test]
    fn test_token_from_query() {
        let token = parse_access_token("controlkit://callback?access_token=q%2Bx").unwrap();
        assert_eq!(token.expose(), "q+x");
    }

    #[test]
    fn test_missing_token_reports_description() {
        let err = parse_access_token("controlkit://callback?error=access_denied&error_description=user%20declined")
            .unwrap_err();
        match err {
            ControlError::RedirectParse(message) => assert!(message.contains("user declined")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_token_is_missing() {
        assert!(parse_access_token("controlkit://callback#access_token=").is_err());
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            parse_access_token("::nope"),
            Err(ControlError::RedirectParse(_))
        ));
    }
}
