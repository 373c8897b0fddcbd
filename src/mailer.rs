//! Notification delivery through the local sendmail binary

use anyhow::{Context, Result, bail};
use reconcile::{Mailer, Notification};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Pipes messages into `<sendmail> -t -i`.
pub struct SendmailMailer {
    program: PathBuf,
}

impl SendmailMailer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Mailer for SendmailMailer {
    fn send(&self, notification: &Notification) -> Result<()> {
        let message = format_message(notification);
        let program = self.program.display().to_string();
        log::debug!("Sending '{}' via {program}", notification.subject);

        let mut child = Command::new(&self.program)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to execute: {program} -t -i"))?;

        // stdin is dropped before waiting so the child sees end of input
        let written = child
            .stdin
            .take()
            .context("sendmail stdin unavailable")
            .and_then(|mut stdin| {
                stdin
                    .write_all(message.as_bytes())
                    .with_context(|| format!("Failed to write message to {program}"))
            });

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for {program}"))?;
        written?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{program} failed ({}): {}", output.status, stderr.trim());
        }
        Ok(())
    }
}

/// Drop duplicate addresses, ignoring case and keeping first occurrences.
pub fn dedupe_addresses<'a, I>(addresses: I, already: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen: Vec<String> = already.iter().map(|a| a.trim().to_lowercase()).collect();
    let mut out = Vec::new();
    for address in addresses {
        let address = address.trim();
        let key = address.to_lowercase();
        if address.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(address.to_string());
    }
    out
}

fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Render an RFC 5322 message
pub fn format_message(notification: &Notification) -> String {
    let to = dedupe_addresses(&notification.recipients, &[]);
    let cc = dedupe_addresses(&notification.cc, &to);

    let mut message = String::new();
    message.push_str(&format!("From: {}\n", header_value(&notification.sender)));
    message.push_str(&format!("To: {}\n", header_value(&to.join(", "))));
    if !cc.is_empty() {
        message.push_str(&format!("Cc: {}\n", header_value(&cc.join(", "))));
    }
    message.push_str(&format!("Subject: {}\n", header_value(&notification.subject)));
    message.push_str("MIME-Version: 1.0\n");
    message.push_str("Content-Type: text/plain; charset=utf-8\n");
    message.push('\n');
    message.push_str(&notification.body);
    if !message.ends_with('\n') {
        message.push('\n');
    }
    message
}
