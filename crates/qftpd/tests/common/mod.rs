//! In-memory remote backend for integration tests
//!
//! Mirrors the conventions of the real API: directories are deleted through a
//! path with a trailing separator, listings are paginated with a cursor, and
//! every login opens an independent session.

#![allow(dead_code)]

use async_trait::async_trait;
use qftpd::remote::{
    ByteSink, ByteSource, DirectoryEntry, DirectoryPage, FileType, Identity, RemoteAttributes,
    RemoteClient, RemoteConnector,
};
use qftpd::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::AsyncReadExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";
pub const USER: &str = "alice";
pub const PASSWORD: &str = "secret";
pub const CLUSTER_NAME: &str = "music";
pub const VERSION: &str = "Qumulo Core 1.2.3";

pub const ADMIN_ID: u64 = 500;
pub const USER_ID: u64 = 1001;
pub const USERS_GROUP_ID: u64 = 513;

const CREATED: &str = "2015-03-05T01:48:05.000000000Z";
const MODIFIED: &str = "2015-03-05T01:48:38.498584000Z";
const CHANGED: &str = "2015-03-05T01:48:33.000000000Z";

/// Bytes handed to a sink per chunk, small enough to exercise chunked reads
const READ_CHUNK: usize = 3;

#[derive(Clone)]
struct Node {
    file_type: FileType,
    file_number: u64,
    mode: String,
    owner: u64,
    group: u64,
    data: Vec<u8>,
}

impl Node {
    fn attributes(&self, path: &str) -> RemoteAttributes {
        let size = match self.file_type {
            FileType::Directory => 0,
            _ => self.data.len(),
        };
        RemoteAttributes {
            mode: self.mode.clone(),
            file_type: self.file_type,
            file_number: self.file_number.to_string(),
            num_links: if self.file_type == FileType::Directory { 2 } else { 1 },
            owner: self.owner.to_string(),
            group: self.group.to_string(),
            size: size.to_string(),
            creation_time: CREATED.to_string(),
            modification_time: MODIFIED.to_string(),
            change_time: CHANGED.to_string(),
            path: path.to_string(),
            name: name_of(path),
        }
    }
}

struct State {
    accounts: HashMap<String, (String, u64)>,
    users: Vec<Identity>,
    groups: HashMap<u64, String>,
    nodes: BTreeMap<String, Node>,
    next_file_number: u64,
    logins: usize,
    directory_reads: usize,
    fail_writes: bool,
}

/// Shared in-memory remote filesystem
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    /// Backend with an admin account, one user account and an empty root
    pub fn new() -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(ADMIN_USER.to_string(), (ADMIN_PASSWORD.to_string(), ADMIN_ID));
        accounts.insert(USER.to_string(), (PASSWORD.to_string(), USER_ID));

        let users = vec![
            Identity {
                name: ADMIN_USER.to_string(),
                id: ADMIN_ID.to_string(),
            },
            Identity {
                name: USER.to_string(),
                id: USER_ID.to_string(),
            },
        ];

        let mut groups = HashMap::new();
        groups.insert(USERS_GROUP_ID, "Users".to_string());

        let mut nodes = BTreeMap::new();
        nodes.insert(
            "/".to_string(),
            Node {
                file_type: FileType::Directory,
                file_number: 2,
                mode: "0755".to_string(),
                owner: ADMIN_ID,
                group: USERS_GROUP_ID,
                data: Vec::new(),
            },
        );

        Self {
            state: Arc::new(Mutex::new(State {
                accounts,
                users,
                groups,
                nodes,
                next_file_number: 3,
                logins: 0,
                directory_reads: 0,
                fail_writes: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn connector(&self) -> Arc<MemoryConnector> {
        Arc::new(MemoryConnector {
            backend: self.clone(),
        })
    }

    /// Session logged in as the regular test user
    pub fn user_client(&self) -> Arc<dyn RemoteClient> {
        Arc::new(MemoryClient {
            backend: self.clone(),
            uid: USER_ID,
        })
    }

    pub fn add_dir(&self, path: &str) {
        self.insert(path, FileType::Directory, "0755", ADMIN_ID, Vec::new());
    }

    pub fn add_file(&self, path: &str, content: &[u8]) {
        self.insert(path, FileType::File, "0644", ADMIN_ID, content.to_vec());
    }

    pub fn add_file_owned(&self, path: &str, owner: u64, group: u64) {
        let mut state = self.lock();
        let file_number = state.next_file_number;
        state.next_file_number += 1;
        state.nodes.insert(
            path.to_string(),
            Node {
                file_type: FileType::File,
                file_number,
                mode: "0600".to_string(),
                owner,
                group,
                data: Vec::new(),
            },
        );
    }

    fn insert(&self, path: &str, file_type: FileType, mode: &str, owner: u64, data: Vec<u8>) {
        let mut state = self.lock();
        let file_number = state.next_file_number;
        state.next_file_number += 1;
        state.nodes.insert(
            path.to_string(),
            Node {
                file_type,
                file_number,
                mode: mode.to_string(),
                owner,
                group: USERS_GROUP_ID,
                data,
            },
        );
    }

    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().nodes.get(path).map(|node| node.data.clone())
    }

    pub fn exists(&self, path: &str) -> bool {
        self.lock().nodes.contains_key(path)
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.lock()
            .nodes
            .get(path)
            .is_some_and(|node| node.file_type == FileType::Directory)
    }

    /// Successful logins so far
    pub fn logins(&self) -> usize {
        self.lock().logins
    }

    /// Directory page requests so far
    pub fn directory_reads(&self) -> usize {
        self.lock().directory_reads
    }

    /// Make every whole-file write fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }
}

fn not_found(path: &str) -> Error {
    Error::remote_status(404, format!("fs_no_such_entry_error: {} does not exist", path))
}

fn name_of(path: &str) -> String {
    path.rsplit('/').next().unwrap_or_default().to_string()
}

fn key(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn child(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir, name)
    }
}

fn parent_of(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(idx) => Some(path[..idx].to_string()),
        None => None,
    }
}

pub struct MemoryConnector {
    backend: MemoryBackend,
}

#[async_trait]
impl RemoteConnector for MemoryConnector {
    async fn login(&self, username: &str, password: &str) -> Result<Arc<dyn RemoteClient>> {
        let mut state = self.backend.lock();
        let uid = match state.accounts.get(username) {
            Some((expected, uid)) if expected == password => *uid,
            _ => {
                return Err(Error::remote_status(
                    401,
                    "api_authentication_error: invalid credentials",
                ));
            }
        };
        state.logins += 1;
        Ok(Arc::new(MemoryClient {
            backend: self.backend.clone(),
            uid,
        }))
    }
}

pub struct MemoryClient {
    backend: MemoryBackend,
    uid: u64,
}

impl MemoryClient {
    fn create(&self, name: &str, dir_path: &str, file_type: FileType) -> Result<String> {
        let mut state = self.backend.lock();
        let dir = key(dir_path);
        match state.nodes.get(&dir) {
            Some(node) if node.file_type == FileType::Directory => {}
            Some(_) => {
                return Err(Error::remote_status(
                    400,
                    format!("fs_not_a_directory_error: {}", dir),
                ));
            }
            None => return Err(not_found(&dir)),
        }

        let path = child(&dir, name);
        if state.nodes.contains_key(&path) {
            return Err(Error::remote_status(
                409,
                format!("fs_entry_exists_error: {}", path),
            ));
        }

        let file_number = state.next_file_number;
        state.next_file_number += 1;
        let mode = if file_type == FileType::Directory { "0755" } else { "0644" };
        state.nodes.insert(
            path.clone(),
            Node {
                file_type,
                file_number,
                mode: mode.to_string(),
                owner: self.uid,
                group: USERS_GROUP_ID,
                data: Vec::new(),
            },
        );
        Ok(path)
    }
}

#[async_trait]
impl RemoteClient for MemoryClient {
    async fn get_attr(&self, path: &str) -> Result<RemoteAttributes> {
        let path = key(path);
        let state = self.backend.lock();
        state
            .nodes
            .get(&path)
            .map(|node| node.attributes(&path))
            .ok_or_else(|| not_found(&path))
    }

    async fn read_directory(
        &self,
        path: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<DirectoryPage> {
        let dir = key(path);
        let mut state = self.backend.lock();
        state.directory_reads += 1;

        match state.nodes.get(&dir) {
            Some(node) if node.file_type == FileType::Directory => {}
            Some(_) => {
                return Err(Error::remote_status(
                    400,
                    format!("fs_not_a_directory_error: {}", dir),
                ));
            }
            None => return Err(not_found(&dir)),
        }

        let children: Vec<DirectoryEntry> = state
            .nodes
            .keys()
            .filter(|candidate| parent_of(candidate).as_deref() == Some(dir.as_str()))
            .map(|candidate| DirectoryEntry {
                name: name_of(candidate),
                path: candidate.clone(),
            })
            .collect();

        let offset: usize = cursor.map_or(0, |c| c.parse().unwrap());
        let end = (offset + limit as usize).min(children.len());
        let entries = children[offset.min(end)..end].to_vec();
        let next = (end < children.len()).then(|| end.to_string());

        Ok(DirectoryPage { entries, next })
    }

    async fn create_file(&self, name: &str, dir_path: &str) -> Result<String> {
        self.create(name, dir_path, FileType::File)
    }

    async fn create_directory(&self, name: &str, dir_path: &str) -> Result<String> {
        self.create(name, dir_path, FileType::Directory)
    }

    async fn write_file(&self, path: &str, mut source: ByteSource) -> Result<()> {
        let mut data = Vec::new();
        source.read_to_end(&mut data).await?;

        let mut state = self.backend.lock();
        if state.fail_writes {
            return Err(Error::remote_status(
                500,
                "fs_write_error: backend unavailable",
            ));
        }
        match state.nodes.get_mut(&key(path)) {
            Some(node) if node.file_type == FileType::File => {
                node.data = data;
                Ok(())
            }
            Some(_) => Err(Error::remote_status(400, format!("fs_not_a_file_error: {}", path))),
            None => Err(not_found(path)),
        }
    }

    async fn read_file(&self, path: &str, sink: &mut dyn ByteSink) -> Result<()> {
        let data = {
            let state = self.backend.lock();
            match state.nodes.get(&key(path)) {
                Some(node) if node.file_type == FileType::File => node.data.clone(),
                Some(_) => {
                    return Err(Error::remote_status(
                        400,
                        format!("fs_not_a_file_error: {}", path),
                    ));
                }
                None => return Err(not_found(path)),
            }
        };

        for chunk in data.chunks(READ_CHUNK) {
            sink.write_chunk(chunk).await?;
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = key(path);
        let mut state = self.backend.lock();

        let file_type = match state.nodes.get(&target) {
            Some(node) => node.file_type,
            None => return Err(not_found(&target)),
        };

        if path.ends_with('/') {
            if file_type != FileType::Directory {
                return Err(Error::remote_status(
                    400,
                    format!("fs_not_a_directory_error: {}", target),
                ));
            }
            if target == "/" {
                return Err(Error::remote_status(400, "fs_cannot_delete_root_error"));
            }
            let has_children = state
                .nodes
                .keys()
                .any(|candidate| parent_of(candidate).as_deref() == Some(target.as_str()));
            if has_children {
                return Err(Error::remote_status(
                    409,
                    format!("fs_directory_not_empty_error: {}", target),
                ));
            }
        } else if file_type == FileType::Directory {
            return Err(Error::remote_status(
                400,
                format!("fs_is_a_directory_error: {}", target),
            ));
        }

        state.nodes.remove(&target);
        Ok(())
    }

    async fn get_user(&self, id: u64) -> Result<Identity> {
        let state = self.backend.lock();
        state
            .users
            .iter()
            .find(|user| user.id == id.to_string())
            .cloned()
            .ok_or_else(|| Error::remote_status(404, format!("auth_user_not_found: {}", id)))
    }

    async fn get_group(&self, id: u64) -> Result<Identity> {
        let state = self.backend.lock();
        state
            .groups
            .get(&id)
            .map(|name| Identity {
                name: name.clone(),
                id: id.to_string(),
            })
            .ok_or_else(|| Error::remote_status(404, format!("auth_group_not_found: {}", id)))
    }

    async fn list_users(&self) -> Result<Vec<Identity>> {
        Ok(self.backend.lock().users.clone())
    }

    async fn cluster_name(&self) -> Result<String> {
        Ok(CLUSTER_NAME.to_string())
    }

    async fn version(&self) -> Result<String> {
        Ok(VERSION.to_string())
    }
}
