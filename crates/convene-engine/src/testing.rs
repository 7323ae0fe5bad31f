//! Test support: a scripted in-memory client.
//!
//! Implements the full capability set over plain collections, records every
//! call for assertions, and lets individual tests arm one-shot failures per
//! method.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use convene_client::{
    Channel, ChannelId, ChannelOps, ChannelPage, ClientError, ClientResult, Cursor, DirectoryOps,
    IdentityOps, MembershipOps, UserId, UserProfile,
};

pub(crate) fn make_channel(id: &str, name: &str, is_private: bool, is_archived: bool) -> Channel {
    Channel {
        id: ChannelId::new(id),
        name: name.to_string(),
        is_private,
        is_archived,
        purpose: String::new(),
        topic: String::new(),
    }
}

pub(crate) fn make_profile(id: &str, display_name: &str, email: Option<&str>) -> UserProfile {
    UserProfile {
        id: UserId::new(id),
        display_name: display_name.to_string(),
        email: email.map(str::to_string),
    }
}

pub(crate) fn user_set(ids: &[&str]) -> BTreeSet<UserId> {
    ids.iter().map(|id| UserId::new(*id)).collect()
}

/// Scripted in-memory client for engine tests.
pub(crate) struct MockClient {
    channels: Mutex<Vec<Channel>>,
    members: Mutex<HashMap<ChannelId, BTreeSet<UserId>>>,
    profiles: Vec<UserProfile>,
    self_id: Option<UserId>,
    page_size: usize,
    next_id: Mutex<u32>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, ClientError>>,
}

impl MockClient {
    pub(crate) fn new() -> Self {
        Self {
            channels: Mutex::new(Vec::new()),
            members: Mutex::new(HashMap::new()),
            profiles: Vec::new(),
            self_id: None,
            page_size: 100,
            next_id: Mutex::new(100),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a channel into the remote directory.
    pub(crate) fn with_channel(self, channel: Channel) -> Self {
        self.channels.lock().unwrap().push(channel);
        self
    }

    /// Seed the member set of a channel.
    pub(crate) fn with_existing_members(self, id: &str, users: &[&str]) -> Self {
        self.members
            .lock()
            .unwrap()
            .insert(ChannelId::new(id), user_set(users));
        self
    }

    /// Seed a resolvable user profile.
    pub(crate) fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    /// Set the acting principal. Without one, `who_am_i` fails.
    pub(crate) fn with_self(mut self, id: &str) -> Self {
        self.self_id = Some(UserId::new(id));
        self
    }

    /// Set the directory page size.
    pub(crate) fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Arm a one-shot failure for the named method.
    pub(crate) fn fail(self, method: &'static str, error: ClientError) -> Self {
        self.failures.lock().unwrap().insert(method, error);
        self
    }

    /// All recorded calls, in order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls starting with the given prefix.
    pub(crate) fn calls_matching(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn take_failure(&self, method: &'static str) -> Option<ClientError> {
        self.failures.lock().unwrap().remove(method)
    }
}

#[async_trait]
impl DirectoryOps for MockClient {
    async fn list_channels(
        &self,
        cursor: Option<&Cursor>,
        include_archived: bool,
    ) -> ClientResult<ChannelPage> {
        self.record("list_channels");
        if let Some(err) = self.take_failure("list_channels") {
            return Err(err);
        }

        let listing: Vec<Channel> = self
            .channels
            .lock()
            .unwrap()
            .iter()
            .filter(|c| include_archived || !c.is_archived)
            .cloned()
            .collect();

        let start: usize = cursor.map(|c| c.as_str().parse().unwrap()).unwrap_or(0);
        let end = (start + self.page_size).min(listing.len());
        let page: Vec<Channel> = listing[start..end].to_vec();

        if end < listing.len() {
            Ok(ChannelPage::with_next(page, Cursor::new(end.to_string())))
        } else {
            Ok(ChannelPage::last(page))
        }
    }
}

#[async_trait]
impl ChannelOps for MockClient {
    async fn create_channel(&self, name: &str, is_private: bool) -> ClientResult<Channel> {
        self.record(format!("create_channel:{name}"));
        if let Some(err) = self.take_failure("create_channel") {
            return Err(err);
        }

        let mut channels = self.channels.lock().unwrap();
        if channels.iter().any(|c| c.name == name) {
            return Err(ClientError::name_taken(name));
        }

        let mut next_id = self.next_id.lock().unwrap();
        let channel = make_channel(&format!("C{next_id}"), name, is_private, false);
        *next_id += 1;
        channels.push(channel.clone());

        // The creating principal becomes a member, as real services do.
        let initial: BTreeSet<UserId> = self.self_id.iter().cloned().collect();
        self.members
            .lock()
            .unwrap()
            .insert(channel.id.clone(), initial);

        Ok(channel)
    }

    async fn get_channel(&self, id: &ChannelId) -> ClientResult<Channel> {
        self.record(format!("get_channel:{id}"));
        if let Some(err) = self.take_failure("get_channel") {
            return Err(err);
        }
        self.channels
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| ClientError::channel_not_found(id.as_str()))
    }

    async fn rename_channel(&self, id: &ChannelId, new_name: &str) -> ClientResult<()> {
        self.record(format!("rename_channel:{id}:{new_name}"));
        if let Some(err) = self.take_failure("rename_channel") {
            return Err(err);
        }
        let mut channels = self.channels.lock().unwrap();
        match channels.iter_mut().find(|c| &c.id == id) {
            Some(channel) => {
                channel.name = new_name.to_string();
                Ok(())
            }
            None => Err(ClientError::channel_not_found(id.as_str())),
        }
    }

    async fn set_topic(&self, id: &ChannelId, topic: &str) -> ClientResult<()> {
        self.record(format!("set_topic:{id}"));
        if let Some(err) = self.take_failure("set_topic") {
            return Err(err);
        }
        let mut channels = self.channels.lock().unwrap();
        match channels.iter_mut().find(|c| &c.id == id) {
            Some(channel) => {
                channel.topic = topic.to_string();
                Ok(())
            }
            None => Err(ClientError::channel_not_found(id.as_str())),
        }
    }

    async fn set_purpose(&self, id: &ChannelId, purpose: &str) -> ClientResult<()> {
        self.record(format!("set_purpose:{id}"));
        if let Some(err) = self.take_failure("set_purpose") {
            return Err(err);
        }
        let mut channels = self.channels.lock().unwrap();
        match channels.iter_mut().find(|c| &c.id == id) {
            Some(channel) => {
                channel.purpose = purpose.to_string();
                Ok(())
            }
            None => Err(ClientError::channel_not_found(id.as_str())),
        }
    }

    async fn archive_channel(&self, id: &ChannelId) -> ClientResult<()> {
        self.record(format!("archive_channel:{id}"));
        if let Some(err) = self.take_failure("archive_channel") {
            return Err(err);
        }
        let mut channels = self.channels.lock().unwrap();
        match channels.iter_mut().find(|c| &c.id == id) {
            Some(channel) if channel.is_archived => {
                Err(ClientError::already_archived(id.as_str()))
            }
            Some(channel) => {
                channel.is_archived = true;
                Ok(())
            }
            None => Err(ClientError::channel_not_found(id.as_str())),
        }
    }

    async fn join_channel(&self, id: &ChannelId) -> ClientResult<()> {
        self.record(format!("join_channel:{id}"));
        if let Some(err) = self.take_failure("join_channel") {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipOps for MockClient {
    async fn list_members(&self, id: &ChannelId) -> ClientResult<BTreeSet<UserId>> {
        self.record(format!("list_members:{id}"));
        if let Some(err) = self.take_failure("list_members") {
            return Err(err);
        }
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_members(&self, id: &ChannelId, users: &BTreeSet<UserId>) -> ClientResult<()> {
        let joined: Vec<&str> = users.iter().map(UserId::as_str).collect();
        self.record(format!("add_members:{id}:{}", joined.join(",")));
        if let Some(err) = self.take_failure("add_members") {
            return Err(err);
        }
        self.members
            .lock()
            .unwrap()
            .entry(id.clone())
            .or_default()
            .extend(users.iter().cloned());
        Ok(())
    }
}

#[async_trait]
impl IdentityOps for MockClient {
    async fn who_am_i(&self) -> ClientResult<UserId> {
        self.record("who_am_i");
        if let Some(err) = self.take_failure("who_am_i") {
            return Err(err);
        }
        self.self_id.clone().ok_or(ClientError::AuthFailed {
            message: "token rejected".to_string(),
        })
    }

    async fn get_user(&self, id: &UserId) -> ClientResult<UserProfile> {
        self.record(format!("get_user:{id}"));
        if let Some(err) = self.take_failure("get_user") {
            return Err(err);
        }
        self.profiles
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| ClientError::user_not_found(id.as_str()))
    }

    async fn find_user_by_email(&self, email: &str) -> ClientResult<UserProfile> {
        self.record(format!("find_user_by_email:{email}"));
        if let Some(err) = self.take_failure("find_user_by_email") {
            return Err(err);
        }
        self.profiles
            .iter()
            .find(|p| p.email.as_deref() == Some(email))
            .cloned()
            .ok_or_else(|| ClientError::user_not_found(email))
    }
}
