//! A small town to wander, chat in, and clear of rats.
//!
//! ```text
//! RUST_LOG=debug cargo run -p town [config.json]
//! ```
//!
//! The optional argument is a JSON file with any `ServerConfig` fields to
//! override, e.g. `{ "bind_addr": "0.0.0.0:3000", "combat_seed": 7 }`.

use std::sync::Arc;

use hearth::prelude::*;

const WORLD: &str = include_str!("../data/world.json");
const TEMPLATES: &str = include_str!("../data/templates.json");

fn load_config() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(ServerConfig::default()),
    }
}

/// Stocks the town with its residents.
async fn populate(realm: &RealmHandle) -> Result<(), HearthError> {
    realm.spawn_monster("rat", "cellar".into()).await?;
    realm.spawn_monster("rat", "cellar".into()).await?;
    realm.spawn_monster("cutpurse", "market".into()).await?;

    let barkeep = Actor::npc(
        "Old Maren",
        "The tavern keeper, polishing the same mug she always polishes.",
        vec![
            "Welcome, traveller. Mind the cellar, the rats are bold this year."
                .to_string(),
            "Keep an eye on your purse in the market.".to_string(),
            "Nothing like a warm fire after a long road.".to_string(),
        ],
    );
    realm.spawn(barkeep, "tavern".into()).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let config = load_config()?;
    let world = Arc::new(WorldMap::from_json(WORLD)?);
    let templates = Arc::new(TemplateTable::from_json(TEMPLATES)?);

    let server = HearthServerBuilder::new()
        .config(config)
        .build(world, templates, DevAuthenticator, MemoryCharacterStore::new())
        .await?;
    populate(server.realm()).await?;

    tracing::info!(addr = %server.local_addr()?, "town is open");
    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_world_loads_with_every_exit_resolved() {
        let world = WorldMap::from_json(WORLD).unwrap();
        assert_eq!(world.start_location(), &LocationId::from("town-square"));
        assert!(world.contains(&"cellar".into()));
    }

    #[test]
    fn test_bundled_templates_have_default_job_and_monsters() {
        let templates = TemplateTable::from_json(TEMPLATES).unwrap();
        let defaults = ServerConfig::default();
        assert!(templates.job(&defaults.default_job).is_ok());
        assert!(templates.monster("rat").is_ok());
        assert!(templates.monster("cutpurse").is_ok());
    }
}
