//! URL helpers shared by the provider client and the relay client.

/// Strip trailing slashes from a base URL so endpoint joins never produce
/// double slashes.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path into a full request URL.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    let base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{base}/{endpoint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        assert_eq!(
            normalize_base_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://api.openai.com/v1///"),
            "https://api.openai.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://api.openai.com/v1"),
            "https://api.openai.com/v1"
        );
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn endpoint_joins_never_double_the_slash() {
        assert_eq!(
            endpoint_url("http://127.0.0.1:8087", "api/chat"),
            "http://127.0.0.1:8087/api/chat"
        );
        assert_eq!(
            endpoint_url("http://127.0.0.1:8087/", "/api/chat"),
            "http://127.0.0.1:8087/api/chat"
        );
        assert_eq!(
            endpoint_url("https://api.openai.com/v1/", "images/generations"),
            "https://api.openai.com/v1/images/generations"
        );
    }
}
