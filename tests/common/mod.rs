#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

use tempfile::TempDir;

/// Helper struct to run certdesk commands in an isolated temp directory
pub struct DeskTest {
    pub temp_dir: TempDir,
    binary_path: String,
    api_url: Option<String>,
}

impl DeskTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        DeskTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_certdesk").to_string(),
            api_url: None,
        }
    }

    /// Point every command at `url` through the environment
    pub fn with_api(mut self, url: &str) -> Self {
        self.api_url = Some(url.to_string());
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("CERTDESK_API_TOKEN")
            .env_remove("CERTDESK_LOG")
            .stdin(Stdio::null());
        match &self.api_url {
            Some(url) => cmd.env("CERTDESK_API_URL", url),
            None => cmd.env_remove("CERTDESK_API_URL"),
        };
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute certdesk command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn write_config(&self, content: &str) {
        let dir = self.temp_dir.path().join(".certdesk");
        fs::create_dir_all(&dir).expect("Failed to create .certdesk directory");
        fs::write(dir.join("config.yaml"), content).expect("Failed to write config file");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.temp_dir.path().join(".certdesk").join("config.yaml"))
            .expect("Failed to read config file")
    }

    pub fn path(&self, name: &str) -> std::path::PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// One request as the canned server saw it
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub target: String,
    pub body: String,
}

/// HTTP/1.1 server answering requests from a fixed script, in order.
///
/// Each scripted response is used once; requests past the end of the script
/// get a 500.
pub struct CannedServer {
    pub url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl CannedServer {
    pub fn start(script: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
        let url = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&seen);
        thread::spawn(move || {
            let mut script = script.into_iter();
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let (status, body) = script
                    .next()
                    .unwrap_or((500, r#"{"message":"unexpected request"}"#.to_string()));
                // Record before answering so the request is visible once the
                // client has its response
                if let Some(request) = read_request(&stream) {
                    recorded.lock().unwrap().push(request);
                    respond(stream, status, &body);
                }
            }
        });

        CannedServer { url, seen }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }
}

fn read_request(stream: &TcpStream) -> Option<SeenRequest> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 || line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.eq_ignore_ascii_case("content-length")
        {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }
    let mut request_body = vec![0u8; content_length];
    reader.read_exact(&mut request_body).ok()?;

    Some(SeenRequest {
        method,
        target,
        body: String::from_utf8_lossy(&request_body).to_string(),
    })
}

fn respond(mut stream: TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
