use std::fs;
use std::path::PathBuf;

use pulse_beacon::{
    is_valid_secret, BadgeUrlBuilder, ConfigStore, FileConfigStore, IdentitySource,
    InstanceIdentity,
};

fn scratch() -> PathBuf {
    std::env::temp_dir().join(format!("pulse-beacon-it-{}", uuid::Uuid::new_v4()))
}

#[test]
fn first_start_generates_and_persists() {
    let dir = scratch();
    let store = FileConfigStore::new(dir.join("pulse.toml"));

    let mut config = store.load().unwrap();
    let (identity, source) = InstanceIdentity::establish(&store, &mut config).unwrap();
    assert_eq!(source, IdentitySource::Generated);

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains(identity.secret().expose()));
    assert!(!raw.contains(identity.public_id().as_str()));

    // second start: same credential, same public id
    let mut config = store.load().unwrap();
    let (again, source) = InstanceIdentity::establish(&store, &mut config).unwrap();
    assert_eq!(source, IdentitySource::Loaded);
    assert_eq!(again.public_id(), identity.public_id());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn malformed_token_on_disk_is_replaced() {
    let dir = scratch();
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("pulse.toml");
    fs::write(
        &path,
        "token = \"sk_live_550e8400-e29b-41d4-c716-446655440000\"\ninterval = 30\n",
    )
    .unwrap();
    let store = FileConfigStore::new(&path);

    let mut config = store.load().unwrap();
    let (identity, source) = InstanceIdentity::establish(&store, &mut config).unwrap();
    assert_eq!(source, IdentitySource::Regenerated);

    let stored = store.load().unwrap();
    assert!(is_valid_secret(&stored.token));
    assert_eq!(stored.token, identity.secret().expose());
    assert_eq!(stored.interval, 30);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn badges_use_public_id_only() {
    let identity = InstanceIdentity::generate();
    let badges = BadgeUrlBuilder::new("https://status.example/badge/", identity.public_id().clone());

    for (kind, url) in badges.all() {
        assert!(url.starts_with("https://status.example/badge?id=srv_pub_"));
        assert!(url.ends_with(&format!("&type={kind}")));
        assert!(!url.contains(identity.secret().uuid_part()));
    }
}
