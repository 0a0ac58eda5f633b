//! Shared helpers for the integration tests
//!
//! Builds CI-shaped artifact archives and in-process stand-ins for the
//! outbound HTTP sinks.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use serde_json::Value;
use viewer_release::notify::{
    HttpReply, MessageSink, NotifyError, SinkError, VersionManagerTransport,
};
use zip::write::SimpleFileOptions;

/// Windows installer name as produced by the SL build
pub const WIN_SL_SETUP: &str = "Phoenix-Firestorm-Releasex64-7-1-11-76496_Setup.exe";

/// Linux tarball name as produced by the OpenSim build
pub const LINUX_OS_TARBALL: &str = "Phoenix-FirestormOS-Releasex64-7-1-11-76496.tar.xz";

/// Write a zip archive at `dir/name` holding `files`
pub fn write_zip(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let file = fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (entry, contents) in files {
        zip.start_file(*entry, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap();
    path
}

/// Lower-case hex MD5 of `data`
pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Version-manager transport that records every body and replies from a script
///
/// Replies are consumed in order; once exhausted every call succeeds.
#[derive(Default)]
pub struct ScriptedTransport {
    pub replies: RefCell<Vec<HttpReply>>,
    pub bodies: RefCell<Vec<Value>>,
}

impl ScriptedTransport {
    pub fn with_replies(replies: Vec<HttpReply>) -> Self {
        Self {
            replies: RefCell::new(replies),
            bodies: RefCell::new(Vec::new()),
        }
    }

    pub fn success() -> HttpReply {
        HttpReply {
            status: 200,
            body: r#"{"result":"success"}"#.to_string(),
        }
    }

    pub fn server_error() -> HttpReply {
        HttpReply {
            status: 500,
            body: "internal error".to_string(),
        }
    }
}

impl VersionManagerTransport for ScriptedTransport {
    fn post_json(&self, _url: &str, body: &Value) -> Result<HttpReply, NotifyError> {
        self.bodies.borrow_mut().push(body.clone());
        let mut replies = self.replies.borrow_mut();
        if replies.is_empty() {
            Ok(Self::success())
        } else {
            Ok(replies.remove(0))
        }
    }
}

/// Message sink that keeps every message it receives
#[derive(Default)]
pub struct CollectingSink {
    pub messages: RefCell<Vec<String>>,
}

impl MessageSink for CollectingSink {
    fn send(&self, text: &str) -> Result<(), SinkError> {
        self.messages.borrow_mut().push(text.to_string());
        Ok(())
    }
}
