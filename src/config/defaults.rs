// Helper defaults kept private to the config module.

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_host() -> String {
    "www.google.com".to_string()
}

pub(crate) fn default_port() -> u16 {
    443
}

pub(crate) fn default_client_hello_path() -> String {
    "tls_clienthello_www_google_com.bin".to_string()
}

pub(crate) fn default_payload_path() -> String {
    "hidden_data".to_string()
}

pub(crate) fn default_connect_timeout() -> u64 {
    10
}

pub(crate) fn default_response_wait() -> u64 {
    0
}

pub(crate) fn default_config_path() -> &'static str {
    "hellopad.toml"
}
