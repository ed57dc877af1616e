use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;

use fastnbt::ByteArray;
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};
use serde::Serialize;

#[derive(Serialize)]
struct Dat {
    #[serde(rename = "Data")]
    data: Data,
}

#[derive(Serialize)]
struct Data {
    version: i32,
    #[serde(rename = "RandomSeed")]
    seed: i64,
    #[serde(rename = "Player")]
    player: Player,
    #[serde(rename = "SpawnX")]
    spawn_x: i32,
    #[serde(rename = "SpawnY")]
    spawn_y: i32,
    #[serde(rename = "SpawnZ")]
    spawn_z: i32,
    #[serde(rename = "LevelName")]
    name: String,
}

#[derive(Serialize)]
struct Player {
    #[serde(rename = "Pos")]
    pos: Vec<f64>,
    #[serde(rename = "Dimension")]
    dimension: i32,
}

#[derive(Serialize)]
struct Chunk {
    #[serde(rename = "Level")]
    level: Level,
}

#[derive(Serialize)]
struct Level {
    #[serde(rename = "Blocks")]
    blocks: ByteArray,
    #[serde(rename = "Data")]
    data: ByteArray,
}

const MCREGION: i32 = 0x4abc;

/// McRegion world whose chunk (0, 0) holds a 3x3x3 stone cube at
/// x, z in 0..3 and y in 62..65, with the player standing on top.
fn stone_world(dir: &Path) {
    fs::create_dir_all(dir.join("region")).unwrap();
    let dat = Dat {
        data: Data {
            version: MCREGION,
            seed: 12345,
            player: Player {
                pos: vec![1.5, 65.0, 1.5],
                dimension: 0,
            },
            spawn_x: 0,
            spawn_y: 64,
            spawn_z: 0,
            name: "Cube".into(),
        },
    };
    let mut enc = GzEncoder::new(File::create(dir.join("level.dat")).unwrap(), Compression::default());
    enc.write_all(&fastnbt::to_bytes(&dat).unwrap()).unwrap();
    enc.finish().unwrap();

    let mut blocks = vec![0i8; 32768];
    for x in 0..3 {
        for z in 0..3 {
            for y in 62..65 {
                blocks[y + z * 128 + x * 2048] = 1;
            }
        }
    }
    let nbt = fastnbt::to_bytes(&Chunk {
        level: Level {
            blocks: ByteArray::new(blocks),
            data: ByteArray::new(vec![0i8; 16384]),
        },
    })
    .unwrap();
    let mut z = ZlibEncoder::new(Vec::new(), Compression::default());
    z.write_all(&nbt).unwrap();
    let body = z.finish().unwrap();

    let mut region = vec![0u8; 8192];
    let mut payload = ((body.len() + 1) as u32).to_be_bytes().to_vec();
    payload.push(2);
    payload.extend_from_slice(&body);
    let count = payload.len().div_ceil(4096);
    payload.resize(count * 4096, 0);
    region.extend_from_slice(&payload);
    // Chunk (0, 0) lives in the first header slot, starting at sector 2.
    region[0..4].copy_from_slice(&[0, 0, 2, count as u8]);
    fs::write(dir.join("region").join("r.0.0.mcr"), region).unwrap();
}

fn quarry() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_quarry"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn load_writes_an_obj_scene() {
    let tmp = tempfile::tempdir().unwrap();
    let world = tmp.path().join("Cube");
    stone_world(&world);
    let out = tmp.path().join("out");
    let status = quarry()
        .args(["load", "--radius", "1", "--log-level", "warn"])
        .arg(&world)
        .arg("--out")
        .arg(&out)
        .arg("--assets")
        .arg(env!("CARGO_MANIFEST_DIR"))
        .status()
        .unwrap();
    assert!(status.success());

    let manifest: toml::Value = toml::from_str(&fs::read_to_string(out.join("scene.toml")).unwrap()).unwrap();
    let protos = manifest["prototypes"].as_array().unwrap();
    assert_eq!(protos.len(), 1);
    assert_eq!(protos[0]["name"].as_str(), Some("mcStone"));
    // The middle block is enclosed on all six sides.
    assert_eq!(protos[0]["count"].as_integer(), Some(26));
    assert!(out.join("mcStone.obj").is_file());
    assert_eq!(
        fs::read_to_string(out.join("mcStone.instances.txt")).unwrap().lines().count(),
        26
    );

    let markers = manifest["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["name"].as_str(), Some("PlayerLoc"));
    assert!(out.join("materials.mtl").is_file());
}

#[test]
fn list_shows_saves() {
    let saves = tempfile::tempdir().unwrap();
    stone_world(&saves.path().join("Cube"));
    fs::create_dir_all(saves.path().join("not-a-world")).unwrap();
    let output = quarry().arg("list").arg("--saves").arg(saves.path()).output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains("Cube"));
}

#[test]
fn world_names_resolve_in_saves_folder() {
    let saves = tempfile::tempdir().unwrap();
    stone_world(&saves.path().join("Cube"));
    let status = quarry()
        .args(["--saves"])
        .arg(saves.path())
        .args(["load", "Cube", "--radius", "1", "--dry-run", "--no-hollow"])
        .arg("--assets")
        .arg(env!("CARGO_MANIFEST_DIR"))
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn missing_world_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let output = quarry()
        .args(["load", "--dry-run"])
        .arg(tmp.path().join("nowhere"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn bad_radius_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let world = tmp.path().join("Cube");
    stone_world(&world);
    let output = quarry()
        .args(["load", "--dry-run", "--radius", "90"])
        .arg(&world)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("radius"));
}
