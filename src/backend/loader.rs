use crate::engine::Side;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File is not valid UTF-8 text: {0:?}")]
    NotText(PathBuf),
}

pub enum LoadRequest {
    Open { side: Side, path: PathBuf },
}

pub enum LoadResponse {
    Loaded {
        side: Side,
        path: PathBuf,
        content: String,
    },
    Failed {
        side: Side,
        error: LoadError,
    },
}

/// Read a file as text.
pub fn read_text(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| LoadError::NotText(path.to_path_buf()))
}

pub struct Loader {
    receiver: Receiver<LoadRequest>,
    response_sender: Sender<LoadResponse>,
}

impl Loader {
    pub fn new(receiver: Receiver<LoadRequest>, response_sender: Sender<LoadResponse>) -> Self {
        Self {
            receiver,
            response_sender,
        }
    }

    pub fn run(&self) {
        while let Ok(request) = self.receiver.recv() {
            let response = match request {
                LoadRequest::Open { side, path } => match read_text(&path) {
                    Ok(content) => {
                        info!("Loaded {:?} as {:?} side", path, side);
                        LoadResponse::Loaded {
                            side,
                            path,
                            content,
                        }
                    }
                    Err(error) => {
                        error!("Failed to load file: {}", error);
                        LoadResponse::Failed { side, error }
                    }
                },
            };

            if self.response_sender.send(response).is_err() {
                break;
            }
        }
    }
}

pub fn spawn_loader() -> (Sender<LoadRequest>, Receiver<LoadResponse>) {
    let (sender, receiver) = std::sync::mpsc::channel();
    let (response_sender, response_receiver) = std::sync::mpsc::channel();
    thread::spawn(move || {
        let loader = Loader::new(receiver, response_sender);
        loader.run();
    });
    (sender, response_receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("test_loader_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_read_text() {
        let path = temp_file("a.txt", "hello\nworld".as_bytes());
        assert_eq!(read_text(&path).unwrap(), "hello\nworld");
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_read_binary_is_rejected() {
        let path = temp_file("b.bin", &[0xff, 0xfe, 0x00]);
        assert!(matches!(read_text(&path), Err(LoadError::NotText(_))));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_loader_thread_round_trip() {
        let path = temp_file("c.txt", "content".as_bytes());
        let (sender, receiver) = spawn_loader();

        sender
            .send(LoadRequest::Open {
                side: Side::Modified,
                path: path.clone(),
            })
            .unwrap();
        sender
            .send(LoadRequest::Open {
                side: Side::Original,
                path: path.with_file_name("missing.txt"),
            })
            .unwrap();

        match receiver.recv_timeout(Duration::from_secs(5)).unwrap() {
            LoadResponse::Loaded { side, content, .. } => {
                assert_eq!(side, Side::Modified);
                assert_eq!(content, "content");
            }
            LoadResponse::Failed { .. } => panic!("expected a loaded file"),
        }
        match receiver.recv_timeout(Duration::from_secs(5)).unwrap() {
            LoadResponse::Failed { side, error } => {
                assert_eq!(side, Side::Original);
                assert!(matches!(error, LoadError::Io { .. }));
            }
            LoadResponse::Loaded { .. } => panic!("expected a failure"),
        }

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
