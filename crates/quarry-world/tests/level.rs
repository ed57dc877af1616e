use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use quarry_world::saves::{has_end, has_nether};
use quarry_world::{CenterSource, Dimension, LevelError, LevelInfo, WorldFormat, list_saves};
use serde::Serialize;

#[derive(Serialize)]
struct Dat {
    #[serde(rename = "Data")]
    data: Data,
}

#[derive(Serialize)]
struct Data {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<i32>,
    #[serde(rename = "RandomSeed")]
    seed: i64,
    #[serde(rename = "Player", skip_serializing_if = "Option::is_none")]
    player: Option<Player>,
    #[serde(rename = "SpawnX")]
    spawn_x: i32,
    #[serde(rename = "SpawnY")]
    spawn_y: i32,
    #[serde(rename = "SpawnZ")]
    spawn_z: i32,
    #[serde(rename = "LevelName")]
    name: String,
    #[serde(rename = "SizeOnDisk")]
    size: i64,
}

#[derive(Serialize)]
struct Player {
    #[serde(rename = "Pos")]
    pos: Vec<f64>,
    #[serde(rename = "Dimension")]
    dimension: i32,
}

fn write_level(dir: &Path, data: Data) {
    fs::create_dir_all(dir).unwrap();
    let nbt = fastnbt::to_bytes(&Dat { data }).unwrap();
    let mut enc = GzEncoder::new(File::create(dir.join("level.dat")).unwrap(), Compression::default());
    enc.write_all(&nbt).unwrap();
    enc.finish().unwrap();
}

fn data(version: Option<i32>, player: Option<Player>) -> Data {
    Data {
        version,
        seed: 12345,
        player,
        spawn_x: 8,
        spawn_y: 64,
        spawn_z: -8,
        name: "Test World".into(),
        size: 3 * 1024 * 1024,
    }
}

#[test]
fn reads_single_player_anvil_save() {
    let tmp = tempfile::tempdir().unwrap();
    let player = Player { pos: vec![100.5, 70.0, -33.25], dimension: -1 };
    write_level(tmp.path(), data(Some(0x4abd), Some(player)));
    let info = LevelInfo::read(tmp.path()).unwrap();
    assert_eq!(info.format, WorldFormat::Anvil);
    assert_eq!(info.seed, 12345);
    assert_eq!(info.name.as_deref(), Some("Test World"));
    assert_eq!(info.size_mib(), Some(3.0));
    let p = info.player.unwrap();
    assert_eq!(p.dimension, Some(Dimension::Nether));
    assert_eq!(info.load_center(Dimension::Nether, None), ([100.5, 70.0, -33.25], CenterSource::Player));
    assert_eq!(info.load_center(Dimension::Overworld, None).1, CenterSource::Origin);
}

#[test]
fn versionless_multiplayer_save_is_mcregion_at_spawn() {
    let tmp = tempfile::tempdir().unwrap();
    write_level(tmp.path(), data(None, None));
    let info = LevelInfo::read(tmp.path()).unwrap();
    assert_eq!(info.format, WorldFormat::McRegion);
    assert!(info.player.is_none());
    assert_eq!(info.load_center(Dimension::Overworld, None), ([8.0, 64.0, -8.0], CenterSource::Spawn));
}

#[test]
fn unknown_version_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    write_level(tmp.path(), data(Some(19134), None));
    assert!(matches!(LevelInfo::read(tmp.path()), Err(LevelError::UnsupportedFormat(19134))));
}

#[test]
fn missing_or_garbage_level_dat_fails() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(matches!(LevelInfo::read(tmp.path()), Err(LevelError::Io { .. })));
    fs::write(tmp.path().join("level.dat"), b"not gzip").unwrap();
    assert!(LevelInfo::read(tmp.path()).is_err());
}

#[test]
fn lists_saves_with_dimensions() {
    let saves = tempfile::tempdir().unwrap();
    write_level(&saves.path().join("b_world"), data(Some(0x4abd), None));
    write_level(&saves.path().join("a_world"), data(None, None));
    fs::create_dir_all(saves.path().join("a_world/DIM-1/region")).unwrap();
    fs::create_dir_all(saves.path().join("not_a_world")).unwrap();
    fs::create_dir_all(saves.path().join("broken")).unwrap();
    fs::write(saves.path().join("broken/level.dat"), b"junk").unwrap();

    let list = list_saves(saves.path());
    let folders: Vec<&str> = list.iter().map(|s| s.folder.as_str()).collect();
    assert_eq!(folders, ["a_world", "b_world"]);
    assert!(list[0].has_nether);
    assert!(!list[0].has_end);
    assert_eq!(list[1].name, "Test World");
    assert!(has_nether(&saves.path().join("a_world")));
    assert!(!has_end(&saves.path().join("b_world")));
}
