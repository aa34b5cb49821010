#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use garden_publish::remote::Result as RemoteResult;
use garden_publish::{
    Assembler, Fingerprint, InMemoryVault, Manifest, NoteSettings, RemoteError, RemoteRepository,
};

/// Remote that keeps fingerprints in memory and counts every call.
#[derive(Default)]
pub struct FakeRemote {
    manifest: Mutex<Manifest>,
    pub messages: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeRemote {
    pub fn with_manifest(entries: &[(&str, &str)]) -> Self {
        let remote = Self::default();
        {
            let mut manifest = remote.manifest.lock().unwrap();
            for (path, hash) in entries {
                manifest.insert(path.to_string(), hash.to_string());
            }
        }
        remote
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check(&self, path: &str, expected: Option<&str>) -> RemoteResult<()> {
        let actual = self.manifest.lock().unwrap().get(path).cloned();
        if actual.as_deref() == expected {
            Ok(())
        } else {
            Err(RemoteError::Conflict {
                path: path.to_string(),
                expected: expected.map(str::to_string),
                actual,
            })
        }
    }
}

#[async_trait]
impl RemoteRepository for FakeRemote {
    async fn manifest(&self) -> RemoteResult<Manifest> {
        self.touch();
        Ok(self.manifest.lock().unwrap().clone())
    }

    async fn current_revision(&self, path: &str) -> RemoteResult<Option<String>> {
        self.touch();
        Ok(self.manifest.lock().unwrap().get(path).cloned())
    }

    async fn put(&self, path: &str, content: &str, revision: Option<&str>, message: &str) -> RemoteResult<()> {
        self.touch();
        self.check(path, revision)?;
        self.manifest
            .lock()
            .unwrap()
            .insert(path.to_string(), Fingerprint::of_text(content).to_string());
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn delete(&self, path: &str, revision: &str, message: &str) -> RemoteResult<()> {
        self.touch();
        self.check(path, Some(revision))?;
        self.manifest.lock().unwrap().remove(path);
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub fn assembler(vault: &Arc<InMemoryVault>) -> Arc<Assembler> {
    Arc::new(Assembler::new(vault.clone(), vault.clone(), NoteSettings::default()))
}
