use std::path::Path;

use pretty_assertions::assert_eq;

use super::{ClientConfig, TcpClient, decode_escapes};

#[test]
fn terminator_is_appended_once() {
	let client = TcpClient::default();
	assert_eq!(client.frame("print(1+1)"), "print(1+1)<!RE>");
	assert_eq!(client.frame("print(1+1)<!RE>"), "print(1+1)<!RE>");
}

#[test]
fn escaped_terminators_are_decoded() {
	assert_eq!(decode_escapes(r"\n--end--\r\n"), "\n--end--\r\n");
	assert_eq!(decode_escapes(r"a\\b\q"), r"a\b\q");

	let client = TcpClient::new(ClientConfig {
		connection_end: r"\n".into(),
		..ClientConfig::default()
	});
	assert_eq!(client.frame("x"), "x\n");
}

#[test]
fn file_command_uses_template() {
	let client = TcpClient::default();
	assert_eq!(client.file_command(Path::new("/tmp/scene.py")), "execfile(\"/tmp/scene.py\")");

	let client = TcpClient::new(ClientConfig {
		file_command: "source {0}".into(),
		..ClientConfig::default()
	});
	assert_eq!(client.file_command(Path::new("C:\\work\\a.mel")), "source C:/work/a.mel");
}

#[test]
fn empty_selection_is_not_sent() {
	let client = TcpClient::new(ClientConfig {
		port: 1,
		..ClientConfig::default()
	});
	assert!(!client.send_selection("").unwrap());
}

#[test]
fn refused_connection_is_an_error() {
	let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
	let port = listener.local_addr().unwrap().port();
	drop(listener);

	let client = TcpClient::new(ClientConfig {
		port,
		timeout: std::time::Duration::from_millis(500),
		..ClientConfig::default()
	});
	assert!(client.send("x").is_err());
}
