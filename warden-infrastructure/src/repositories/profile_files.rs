// Profile persistence as one JSON document per game.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;
use warden_domain::ports::ProfileRepository;
use warden_domain::GameProfile;

pub struct ProfileFileRepository {
    dir: PathBuf,
}

impl ProfileFileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, game_id: &str) -> PathBuf {
        self.dir.join(format!("{game_id}.json"))
    }
}

#[async_trait]
impl ProfileRepository for ProfileFileRepository {
    async fn save(&self, profile: &GameProfile) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(profile)?;
        fs::write(self.path_for(&profile.game_id), content).await?;
        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<GameProfile>> {
        if !Path::new(&self.dir).exists() {
            return Ok(Vec::new());
        }
        let mut profiles = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            match serde_json::from_str::<GameProfile>(&content) {
                Ok(profile) => profiles.push(profile),
                // A corrupt file disables one game, not the service.
                Err(err) => warn!("skipping unreadable profile {}: {err}", path.display()),
            }
        }
        Ok(profiles)
    }
}
