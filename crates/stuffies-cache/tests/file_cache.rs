use std::path::PathBuf;

use stuffies_cache::{Cache, Session, SessionProfile};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "stuffies-cache-it-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn session_survives_reopening_the_store() {
    let dir = scratch_dir("session");

    {
        let session = Session::new(Cache::open_dir(&dir).unwrap());
        session
            .save(&SessionProfile {
                token: Some("jwt-abc".into()),
                username: Some("admin".into()),
                roles: vec!["ROLE_ADMIN".into()],
                ..Default::default()
            })
            .unwrap();
    }

    let session = Session::new(Cache::open_dir(&dir).unwrap());
    assert_eq!(session.token().as_deref(), Some("jwt-abc"));
    assert!(session.profile().unwrap().is_admin());

    let mut keys = Cache::open_dir(&dir).unwrap().keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["session", "token"]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn typed_values_overwrite_whole_entry() {
    let dir = scratch_dir("overwrite");
    let cache = Cache::open_dir(&dir).unwrap();

    cache.set("stuffies:cart", &vec![1, 2, 3]).unwrap();
    cache.set("stuffies:cart", &Vec::<i32>::new()).unwrap();

    let back: Vec<i32> = cache.get("stuffies:cart").unwrap().unwrap();
    assert!(back.is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}
