//! Parsing of the compact connection string given on the command line.
//!
//! ```text
//! [proto://][username[:password]@]host[/path][:port]
//! ```

use std::fmt;
use std::io;
use std::str::FromStr;

use thiserror::Error;

pub(crate) const DESCRIPTOR_FORMAT: &str = "[proto://][username[:password]@]host[/path][:port]";

const FTP_PORT: u16 = 21;
const SFTP_PORT: u16 = 22;

#[derive(Debug, Error)]
pub(crate) enum DescriptorError {
    #[error("malformed connection string: {0}")]
    MalformedInput(String),
    #[error("unsupported protocol {0:?}")]
    UnsupportedProtocol(String),
    #[error("host name is empty")]
    EmptyHost,
    #[error("read password")]
    Prompt(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Protocol {
    Ftp,
    Sftp,
}

impl Protocol {
    pub(crate) fn default_port(self) -> u16 {
        match self {
            Protocol::Ftp => FTP_PORT,
            Protocol::Sftp => SFTP_PORT,
        }
    }

    fn from_port(port: u16) -> Option<Self> {
        match port {
            FTP_PORT => Some(Protocol::Ftp),
            SFTP_PORT => Some(Protocol::Sftp),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Protocol::Ftp => "ftp",
            Protocol::Sftp => "sftp",
        }
    }
}

impl FromStr for Protocol {
    type Err = DescriptorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("ftp") {
            Ok(Protocol::Ftp)
        } else if value.eq_ignore_ascii_case("sftp") {
            Ok(Protocol::Sftp)
        } else {
            Err(DescriptorError::UnsupportedProtocol(value.to_string()))
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ConnectionDescriptor {
    pub(crate) protocol: Protocol,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) host: String,
    pub(crate) path: String,
    pub(crate) port: u16,
}

impl ConnectionDescriptor {
    /// Directory to list; an empty path means the server root.
    pub(crate) fn remote_dir(&self) -> &str {
        if self.path.is_empty() { "/" } else { &self.path }
    }

    pub(crate) fn summary(&self) -> String {
        format!("[{}] {}{}:{}", self.protocol, self.host, self.path, self.port)
    }
}

// Keeps the password out of logs.
impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("host", &self.host)
            .field("path", &self.path)
            .field("port", &self.port)
            .finish()
    }
}

pub(crate) trait PasswordPrompt {
    fn read_password(&mut self) -> io::Result<String>;
}

/// Reads the password from the controlling terminal without echo.
pub(crate) struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn read_password(&mut self) -> io::Result<String> {
        rpassword::prompt_password("Enter Password: ")
    }
}

pub(crate) fn parse(raw: &str) -> Result<ConnectionDescriptor, DescriptorError> {
    parse_with(raw, &mut TerminalPrompt)
}

pub(crate) fn parse_with(
    raw: &str,
    prompt: &mut dyn PasswordPrompt,
) -> Result<ConnectionDescriptor, DescriptorError> {
    let fields = scan(raw.trim())?;

    let path = if fields.path.is_empty() {
        String::new()
    } else {
        format!("/{}", fields.path)
    };

    let mut protocol = match fields.protocol {
        "" => None,
        scheme => Some(scheme.parse::<Protocol>()?),
    };
    let port = match fields.port {
        "" => None,
        digits => Some(
            digits
                .parse::<u16>()
                .map_err(|_| malformed(format!("port {digits} is out of range")))?,
        ),
    };
    if protocol.is_none() {
        protocol = port.and_then(Protocol::from_port);
    }
    let protocol = protocol.unwrap_or(Protocol::Ftp);
    let port = port.unwrap_or_else(|| protocol.default_port());

    if fields.host.is_empty() {
        return Err(DescriptorError::EmptyHost);
    }

    let mut password = fields.password.to_string();
    if password.is_empty() && !fields.username.is_empty() {
        password = prompt.read_password().map_err(DescriptorError::Prompt)?;
    }

    Ok(ConnectionDescriptor {
        protocol,
        username: fields.username.to_string(),
        password,
        host: fields.host.to_string(),
        path,
        port,
    })
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RawFields<'a> {
    protocol: &'a str,
    username: &'a str,
    password: &'a str,
    host: &'a str,
    path: &'a str,
    port: &'a str,
}

fn scan(input: &str) -> Result<RawFields<'_>, DescriptorError> {
    if let Some(bad) = input.chars().find(|c| c.is_control() || c.is_whitespace()) {
        return Err(malformed(format!("unexpected character {bad:?}")));
    }

    let (protocol, rest) = match input.split_once("://") {
        Some((scheme, rest)) if !scheme.contains(':') => (scheme, rest),
        _ => ("", input),
    };

    let (username, password, rest) = match rest.split_once('@') {
        Some((userinfo, rest)) => {
            let (username, password) = userinfo.split_once(':').unwrap_or((userinfo, ""));
            (username, password, rest)
        }
        None => ("", "", rest),
    };

    let host_end = rest.find([':', '/']).unwrap_or(rest.len());
    let (host, mut rest) = rest.split_at(host_end);

    let mut path = "";
    if let Some(after_slash) = rest.strip_prefix('/') {
        let path_end = after_slash.find(':').unwrap_or(after_slash.len());
        let (raw_path, tail) = after_slash.split_at(path_end);
        path = raw_path.strip_suffix('/').unwrap_or(raw_path);
        rest = tail;
    }

    let port = match rest.strip_prefix(':') {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits
        }
        Some(other) => return Err(malformed(format!("invalid port {other:?}"))),
        None => "",
    };

    Ok(RawFields {
        protocol,
        username,
        password,
        host,
        path,
        port,
    })
}

fn malformed(reason: String) -> DescriptorError {
    DescriptorError::MalformedInput(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPrompt {
        answer: Option<String>,
        calls: usize,
    }

    impl FixedPrompt {
        fn new(answer: &str) -> Self {
            Self {
                answer: Some(answer.to_string()),
                calls: 0,
            }
        }

        fn failing() -> Self {
            Self {
                answer: None,
                calls: 0,
            }
        }
    }

    impl PasswordPrompt for FixedPrompt {
        fn read_password(&mut self) -> io::Result<String> {
            self.calls += 1;
            self.answer
                .clone()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no tty"))
        }
    }

    fn parse_quiet(raw: &str) -> Result<ConnectionDescriptor, DescriptorError> {
        parse_with(raw, &mut FixedPrompt::failing())
    }

    #[test]
    fn bare_host_defaults_to_ftp() {
        let desc = parse_quiet("host").unwrap();
        assert_eq!(desc.protocol, Protocol::Ftp);
        assert_eq!(desc.port, 21);
        assert_eq!(desc.host, "host");
        assert_eq!(desc.path, "");
        assert_eq!(desc.remote_dir(), "/");
    }

    #[test]
    fn port_22_implies_sftp() {
        let desc = parse_quiet("host:22").unwrap();
        assert_eq!(desc.protocol, Protocol::Sftp);
        assert_eq!(desc.port, 22);
    }

    #[test]
    fn protocol_implies_port() {
        assert_eq!(parse_quiet("sftp://host").unwrap().port, 22);
        assert_eq!(parse_quiet("ftp://host").unwrap().port, 21);
    }

    #[test]
    fn unknown_port_without_scheme_falls_back_to_ftp() {
        let desc = parse_quiet("host:2121").unwrap();
        assert_eq!(desc.protocol, Protocol::Ftp);
        assert_eq!(desc.port, 2121);
    }

    #[test]
    fn explicit_scheme_wins_over_port() {
        let desc = parse_quiet("sftp://host:21").unwrap();
        assert_eq!(desc.protocol, Protocol::Sftp);
        assert_eq!(desc.port, 21);
    }

    #[test]
    fn empty_input_has_no_host() {
        assert!(matches!(parse_quiet(""), Err(DescriptorError::EmptyHost)));
        assert!(matches!(parse_quiet("   "), Err(DescriptorError::EmptyHost)));
        assert!(matches!(parse_quiet("user:pw@:21"), Err(DescriptorError::EmptyHost)));
    }

    #[test]
    fn full_descriptor_round_trips() {
        let cases = [
            ("ftp", "user", "pass", "example.org", "/incoming", 21u16),
            ("sftp", "bob", "p:w", "10.0.0.5", "/data/media", 2222),
            ("sftp", "alice", "secret", "nas", "", 22),
        ];
        for (proto, user, pass, host, path, port) in cases {
            let raw = format!("{proto}://{user}:{pass}@{host}{path}:{port}");
            let desc = parse_quiet(&raw).unwrap();
            let rebuilt = format!(
                "{}://{}:{}@{}{}:{}",
                desc.protocol, desc.username, desc.password, desc.host, desc.path, desc.port
            );
            assert_eq!(rebuilt, raw);
        }
    }

    #[test]
    fn trailing_slash_is_stripped_from_path() {
        assert_eq!(parse_quiet("host/dir/").unwrap().path, "/dir");
        assert_eq!(parse_quiet("host/dir/:22").unwrap().path, "/dir");
        assert_eq!(parse_quiet("host/").unwrap().path, "");
        assert_eq!(parse_quiet("host/a/b").unwrap().path, "/a/b");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let desc = parse_quiet("  \tftp://host/x:21\r\n").unwrap();
        assert_eq!(desc.host, "host");
        assert_eq!(desc.path, "/x");
    }

    #[test]
    fn grammar_violations_are_malformed() {
        for raw in ["host:", "host:abc", "host:21:22", "ho st", "host/pa th", "host:99999"] {
            assert!(
                matches!(parse_quiet(raw), Err(DescriptorError::MalformedInput(_))),
                "{raw} should be malformed"
            );
        }
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        assert!(matches!(
            parse_quiet("http://host"),
            Err(DescriptorError::UnsupportedProtocol(scheme)) if scheme == "http"
        ));
    }

    #[test]
    fn missing_password_is_prompted() {
        let mut prompt = FixedPrompt::new("typed");
        let desc = parse_with("user@host", &mut prompt).unwrap();
        assert_eq!(prompt.calls, 1);
        assert_eq!(desc.username, "user");
        assert_eq!(desc.password, "typed");
    }

    #[test]
    fn anonymous_or_complete_credentials_skip_prompt() {
        let mut prompt = FixedPrompt::new("unused");
        parse_with("host", &mut prompt).unwrap();
        parse_with("user:pw@host", &mut prompt).unwrap();
        assert_eq!(prompt.calls, 0);
    }

    #[test]
    fn prompt_failure_is_reported() {
        assert!(matches!(
            parse_quiet("user@host"),
            Err(DescriptorError::Prompt(_))
        ));
    }

    #[test]
    fn empty_host_is_reported_before_prompting() {
        let mut prompt = FixedPrompt::new("unused");
        assert!(matches!(
            parse_with("user@", &mut prompt),
            Err(DescriptorError::EmptyHost)
        ));
        assert_eq!(prompt.calls, 0);
    }

    #[test]
    fn debug_output_masks_password() {
        let desc = parse_quiet("user:hunter2@host").unwrap();
        let debug = format!("{desc:?}");
        assert!(!debug.contains("hunter2"));
        assert_eq!(desc.summary(), "[ftp] host:21");
    }
}
