//! Wavefront OBJ scene writer.
//!
//! Layout of an output directory:
//! * `<prototype>.obj` - one mesh per prototype in block space, Z up;
//! * `<prototype>.instances.txt` - `x y z quarter_turns` per placement;
//! * `markers/<name>.txt` - `x y z` per marker point;
//! * `materials.mtl` - every material referenced by a prototype;
//! * the atlas image, copied or synthesized blank;
//! * `scene.toml` - manifest tying the files together.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use quarry_blocks::{Material, ShadingKind};
use quarry_geom::{Placement, Vec3};
use quarry_mesh::PrototypeMesh;
use quarry_runtime::{AtlasImage, Prototype, SceneError, SceneSink};
use serde::Serialize;

pub const MATERIAL_LIB: &str = "materials.mtl";
pub const MANIFEST: &str = "scene.toml";
const MARKER_DIR: &str = "markers";

#[derive(Debug, Default, Serialize)]
pub struct Manifest {
    pub atlas: String,
    pub atlas_placeholder: bool,
    pub prototypes: Vec<ManifestPrototype>,
    pub markers: Vec<ManifestMarkers>,
}

#[derive(Debug, Serialize)]
pub struct ManifestPrototype {
    pub name: String,
    pub material: String,
    pub mesh: String,
    pub instances: String,
    pub count: usize,
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub struct ManifestMarkers {
    pub name: String,
    pub file: String,
    pub count: usize,
}

pub struct ObjExporter {
    out: PathBuf,
    atlas_file: Option<String>,
    materials: Vec<Material>,
    manifest: Manifest,
}

impl ObjExporter {
    pub fn create(out: impl Into<PathBuf>) -> Result<Self, SceneError> {
        let out = out.into();
        fs::create_dir_all(&out)?;
        Ok(Self {
            out,
            atlas_file: None,
            materials: Vec::new(),
            manifest: Manifest::default(),
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out
    }

    fn write_mesh(
        &self,
        path: &Path,
        name: &str,
        material: &str,
        mesh: &PrototypeMesh,
    ) -> Result<(), SceneError> {
        let mut w = BufWriter::new(File::create(path)?);
        writeln!(w, "mtllib {MATERIAL_LIB}")?;
        writeln!(w, "o {name}")?;
        for p in &mesh.positions {
            writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
        }
        // One uv and one normal per quad corner, so OBJ indices follow quad order.
        for q in &mesh.quads {
            for uv in &q.uvs {
                writeln!(w, "vt {} {}", uv.x, uv.y)?;
            }
        }
        for q in &mesh.quads {
            writeln!(w, "vn {} {} {}", q.normal.x, q.normal.y, q.normal.z)?;
        }
        writeln!(w, "usemtl {material}")?;
        for (i, q) in mesh.quads.iter().enumerate() {
            write!(w, "f")?;
            for (k, v) in q.verts.iter().enumerate() {
                write!(w, " {}/{}/{}", v + 1, i * 4 + k + 1, i + 1)?;
            }
            writeln!(w)?;
        }
        w.flush()?;
        Ok(())
    }

    fn write_materials(&self) -> Result<(), SceneError> {
        let mut w = BufWriter::new(File::create(self.out.join(MATERIAL_LIB))?);
        for m in &self.materials {
            writeln!(w, "newmtl {}", m.name)?;
            let [r, g, b] = m.color;
            writeln!(w, "Kd {r} {g} {b}")?;
            match m.kind {
                ShadingKind::Emissive { strength } => {
                    writeln!(w, "Ke {} {} {}", r * strength, g * strength, b * strength)?
                }
                ShadingKind::Translucent => writeln!(w, "d 0.5")?,
                _ => {}
            }
            if let (true, Some(atlas)) = (m.textured, &self.atlas_file) {
                writeln!(w, "map_Kd {atlas}")?;
                if m.kind.is_cutout() {
                    writeln!(w, "map_d {atlas}")?;
                }
            }
            writeln!(w)?;
        }
        w.flush()?;
        Ok(())
    }
}

fn write_points(path: &Path, rows: impl Iterator<Item = String>) -> Result<(), SceneError> {
    let mut w = BufWriter::new(File::create(path)?);
    for row in rows {
        writeln!(w, "{row}")?;
    }
    w.flush()?;
    Ok(())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "atlas.png".to_string())
}

impl SceneSink for ObjExporter {
    fn set_atlas(&mut self, atlas: &AtlasImage) -> Result<(), SceneError> {
        let name = file_name_of(&atlas.path);
        let dest = self.out.join(&name);
        if atlas.placeholder {
            log::warn!(
                "atlas {} missing, writing a blank {}x{} image",
                atlas.path.display(),
                atlas.width,
                atlas.height
            );
            image::RgbaImage::new(atlas.width, atlas.height).save(&dest)?;
        } else if atlas.path != dest {
            fs::copy(&atlas.path, &dest)?;
        }
        self.manifest.atlas = name.clone();
        self.manifest.atlas_placeholder = atlas.placeholder;
        self.atlas_file = Some(name);
        Ok(())
    }

    fn add_prototype(
        &mut self,
        prototype: &Prototype,
        material: &Material,
        placements: &[Placement],
        visible: bool,
    ) -> Result<(), SceneError> {
        let mesh = format!("{}.obj", prototype.name);
        let instances = format!("{}.instances.txt", prototype.name);
        self.write_mesh(&self.out.join(&mesh), &prototype.name, &material.name, &prototype.mesh)?;
        write_points(
            &self.out.join(&instances),
            placements.iter().map(|p| {
                let t = p.translation;
                format!("{} {} {} {}", t.x, t.y, t.z, p.quarter_turns)
            }),
        )?;
        if !self.materials.iter().any(|m| m.name == material.name) {
            self.materials.push(material.clone());
        }
        self.manifest.prototypes.push(ManifestPrototype {
            name: prototype.name.clone(),
            material: material.name.clone(),
            mesh,
            instances,
            count: placements.len(),
            visible,
        });
        Ok(())
    }

    fn add_markers(&mut self, name: &str, points: &[Vec3]) -> Result<(), SceneError> {
        let dir = self.out.join(MARKER_DIR);
        fs::create_dir_all(&dir)?;
        let file = format!("{MARKER_DIR}/{name}.txt");
        write_points(
            &self.out.join(&file),
            points.iter().map(|p| format!("{} {} {}", p.x, p.y, p.z)),
        )?;
        self.manifest.markers.push(ManifestMarkers {
            name: name.to_string(),
            file,
            count: points.len(),
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SceneError> {
        self.write_materials()?;
        let text = toml::to_string_pretty(&self.manifest).map_err(|e| SceneError::Rejected {
            name: MANIFEST.to_string(),
            reason: e.to_string(),
        })?;
        fs::write(self.out.join(MANIFEST), text)?;
        log::info!(
            "wrote {} prototypes and {} marker sets to {}",
            self.manifest.prototypes.len(),
            self.manifest.markers.len(),
            self.out.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_blocks::{FaceTextures, MaterialId, MaterialLibrary, ShadingParams, ShapeKind};
    use quarry_mesh::{AtlasLayout, Form, synthesize};
    use quarry_runtime::PrototypeId;

    fn stone() -> (Prototype, Material) {
        let atlas = AtlasLayout::default();
        let mut lib = MaterialLibrary::new();
        let id: MaterialId =
            lib.material_for("mcStoneMat", [116, 116, 116], &ShadingParams::default(), true);
        let material = lib.get(id).cloned().unwrap();
        let prototype = Prototype {
            id: PrototypeId(0),
            name: "mcStone".into(),
            block: 1,
            form: Form::Standard,
            mesh: synthesize(ShapeKind::Box, Form::Standard, &FaceTextures::Cube([308; 6]), &atlas),
            material: id,
            placeholder: false,
        };
        (prototype, material)
    }

    #[test]
    fn writes_mesh_instances_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ObjExporter::create(dir.path().join("scene")).unwrap();
        let atlas =
            AtlasImage::placeholder(PathBuf::from("/missing/textures_0.png"), &AtlasLayout::new(2, 4));
        sink.set_atlas(&atlas).unwrap();
        let (proto, mat) = stone();
        let placements = [
            Placement::at(Vec3::new(-1.0, -2.0, 64.0)),
            Placement::rotated(Vec3::new(-1.0, -3.0, 64.0), 3),
        ];
        sink.add_prototype(&proto, &mat, &placements, false).unwrap();
        sink.add_markers("PlayerLoc", &[Vec3::new(-0.5, -0.5, 65.0)]).unwrap();
        sink.finish().unwrap();

        let out = sink.out_dir();
        let obj = fs::read_to_string(out.join("mcStone.obj")).unwrap();
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 24);
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 6);
        assert!(obj.contains("usemtl mcStoneMat"));

        let inst = fs::read_to_string(out.join("mcStone.instances.txt")).unwrap();
        assert_eq!(inst.lines().collect::<Vec<_>>(), ["-1 -2 64 0", "-1 -3 64 3"]);

        let markers = fs::read_to_string(out.join("markers/PlayerLoc.txt")).unwrap();
        assert_eq!(markers.trim(), "-0.5 -0.5 65");

        let (w, h) = image::image_dimensions(out.join("textures_0.png")).unwrap();
        assert_eq!((w, h), (8, 8));

        let mtl = fs::read_to_string(out.join(MATERIAL_LIB)).unwrap();
        assert!(mtl.contains("newmtl mcStoneMat"));
        assert!(mtl.contains("map_Kd textures_0.png"));

        let manifest = fs::read_to_string(out.join(MANIFEST)).unwrap();
        let parsed: toml::Value = toml::from_str(&manifest).unwrap();
        let protos = parsed["prototypes"].as_array().unwrap();
        assert_eq!(protos.len(), 1);
        assert_eq!(protos[0]["count"].as_integer(), Some(2));
        assert_eq!(protos[0]["visible"].as_bool(), Some(false));
        assert_eq!(parsed["atlas_placeholder"].as_bool(), Some(true));
    }

    #[test]
    fn shared_material_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ObjExporter::create(dir.path()).unwrap();
        let (proto, mat) = stone();
        let mut other = proto.clone();
        other.name = "mcStoneCopy".into();
        let one = [Placement::at(Vec3::ZERO)];
        sink.add_prototype(&proto, &mat, &one, true).unwrap();
        sink.add_prototype(&other, &mat, &one, true).unwrap();
        sink.finish().unwrap();
        let mtl = fs::read_to_string(dir.path().join(MATERIAL_LIB)).unwrap();
        assert_eq!(mtl.matches("newmtl").count(), 1);
        // No atlas was set, so nothing is mapped.
        assert!(!mtl.contains("map_Kd"));
    }

    #[test]
    fn cutout_materials_map_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ObjExporter::create(dir.path()).unwrap();
        sink.set_atlas(&AtlasImage::placeholder(PathBuf::from("terrain.png"), &AtlasLayout::new(2, 4)))
            .unwrap();
        let (proto, stone) = stone();
        let mut lib = MaterialLibrary::new();
        let stencil = ShadingParams {
            stencil: true,
            ..ShadingParams::default()
        };
        let id = lib.material_for("mcGlassMat", [255, 255, 255], &stencil, true);
        let glass = lib.get(id).cloned().unwrap();
        let mut pane = proto.clone();
        pane.name = "mcGlass".into();
        let one = [Placement::at(Vec3::ZERO)];
        sink.add_prototype(&proto, &stone, &one, true).unwrap();
        sink.add_prototype(&pane, &glass, &one, true).unwrap();
        sink.finish().unwrap();

        let mtl = fs::read_to_string(dir.path().join(MATERIAL_LIB)).unwrap();
        let glass_block = mtl.split("newmtl ").find(|b| b.starts_with("mcGlassMat")).unwrap();
        assert!(glass_block.contains("map_d terrain.png"));
        let stone_block = mtl.split("newmtl ").find(|b| b.starts_with("mcStoneMat")).unwrap();
        assert!(!stone_block.contains("map_d"));
    }
}
