//! Model loading: glTF documents decoded into CPU scene subtrees.
//!
//! Loading never touches the GPU; it produces a [`MeshNode`] hierarchy the
//! scene uploads lazily on the next frame. The load is cooperative: a
//! [`CancelToken`] is checked between fetches so teardown can abandon an
//! in-flight load.

use std::{
    io::{BufReader, Cursor},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context as _, Result, bail};

use crate::data_structures::{
    instance::Instance,
    model::{Geometry, MaterialData, MeshVertex, Primitive},
    scene_graph::MeshNode,
};

pub mod fetch;

/// Shared cancellation flag for an in-flight load.
///
/// Cloned into the load task; the owner cancels it on teardown. The loader
/// checks it between await points, and the completion handler checks it one
/// last time before attaching, so a load that outlives its viewer never
/// mutates anything.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Load a glTF model into a CPU scene subtree.
///
/// `progress` receives cumulative loaded bytes against the total implied by
/// the document (root file plus declared buffer lengths). Fails on fetch or
/// decode errors and when the token is cancelled mid-flight; the caller
/// decides how loudly to report either.
pub async fn load_model_gltf(
    file_name: &str,
    token: &CancelToken,
    progress: &mut (dyn FnMut(u64, u64) + Send),
) -> Result<MeshNode> {
    if token.is_cancelled() {
        bail!("model load cancelled");
    }
    let gltf_bytes = fetch::load_binary(file_name)
        .await
        .with_context(|| format!("fetching model {}", file_name))?;
    let root_bytes = gltf_bytes.len() as u64;
    let gltf_reader = BufReader::new(Cursor::new(gltf_bytes));
    let gltf = gltf::Gltf::from_reader(gltf_reader)
        .with_context(|| format!("parsing model {}", file_name))?;

    let total_bytes = root_bytes
        + gltf
            .buffers()
            .filter(|buffer| matches!(buffer.source(), gltf::buffer::Source::Uri(_)))
            .map(|buffer| buffer.length() as u64)
            .sum::<u64>();
    let mut loaded_bytes = root_bytes;
    progress(loaded_bytes, total_bytes);

    // Buffers are fetched one by one so byte progress stays meaningful and
    // cancellation takes effect between fetches.
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        if token.is_cancelled() {
            bail!("model load cancelled");
        }
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.to_vec());
                };
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = fetch::load_binary(uri)
                    .await
                    .with_context(|| format!("fetching buffer {}", uri))?;
                loaded_bytes += bin.len() as u64;
                progress(loaded_bytes, total_bytes);
                buffer_data.push(bin);
            }
        }
    }

    if token.is_cancelled() {
        bail!("model load cancelled");
    }
    let materials = load_materials(&gltf, &buffer_data).await?;

    let mut roots = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            roots.push(to_mesh_node(node, &buffer_data, &materials));
        }
    }

    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        let mut root = MeshNode::group(file_name);
        for node in roots {
            root.add_child(node);
        }
        root
    };

    Ok(root)
}

enum ImageSource {
    View(Vec<u8>),
    Uri(String),
}

/// Decode every material's base color, fetching URI images concurrently.
async fn load_materials(gltf: &gltf::Gltf, buffer_data: &[Vec<u8>]) -> Result<Vec<MaterialData>> {
    let mut pending = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let name = material.name().unwrap_or("unnamed_material").to_string();
        let source = pbr.base_color_texture().map(|info| {
            match info.texture().source().source() {
                gltf::image::Source::View { view, .. } => {
                    let buffer = &buffer_data[view.buffer().index()];
                    ImageSource::View(buffer[view.offset()..view.offset() + view.length()].to_vec())
                }
                gltf::image::Source::Uri { uri, .. } => ImageSource::Uri(uri.to_string()),
            }
        });
        pending.push((name, pbr.base_color_factor(), source));
    }

    let loads = pending.into_iter().map(|(name, base_color, source)| async move {
        let image = match source {
            None => None,
            Some(ImageSource::View(bytes)) => Some(decode_image(&bytes, &name)?),
            Some(ImageSource::Uri(uri)) => {
                let bytes = fetch::load_binary(&uri)
                    .await
                    .with_context(|| format!("fetching image {}", uri))?;
                Some(decode_image(&bytes, &name)?)
            }
        };
        Ok::<MaterialData, anyhow::Error>(MaterialData {
            name,
            base_color,
            image,
        })
    });
    futures::future::join_all(loads).await.into_iter().collect()
}

fn decode_image(bytes: &[u8], name: &str) -> Result<image::RgbaImage> {
    let img = image::load_from_memory(bytes).with_context(|| format!("decoding image {}", name))?;
    Ok(img.to_rgba8())
}

/// Convert one glTF node (and its children) into the viewer's scene form.
fn to_mesh_node(
    node: gltf::scene::Node,
    buf: &[Vec<u8>],
    materials: &[MaterialData],
) -> MeshNode {
    let name = node.name().unwrap_or("unnamed_node").to_string();

    let primitives = node
        .mesh()
        .map(|mesh| {
            mesh.primitives()
                .map(|primitive| {
                    let reader = primitive.reader(|buffer| {
                        buf.get(buffer.index()).map(|data| data.as_slice())
                    });

                    let mut vertices = Vec::new();
                    if let Some(positions) = reader.read_positions() {
                        for position in positions {
                            vertices.push(MeshVertex {
                                position,
                                normal: Default::default(),
                                tex_coords: Default::default(),
                            });
                        }
                    }
                    if let Some(normals) = reader.read_normals() {
                        for (i, normal) in normals.enumerate() {
                            if let Some(vertex) = vertices.get_mut(i) {
                                vertex.normal = normal;
                            }
                        }
                    }
                    if let Some(tex_coords) = reader.read_tex_coords(0).map(|tc| tc.into_f32()) {
                        for (i, tex_coord) in tex_coords.enumerate() {
                            if let Some(vertex) = vertices.get_mut(i) {
                                vertex.tex_coords = tex_coord;
                            }
                        }
                    }

                    let mut indices = Vec::new();
                    if let Some(raw) = reader.read_indices() {
                        indices.extend(raw.into_u32());
                    }

                    let material = primitive
                        .material()
                        .index()
                        .and_then(|idx| materials.get(idx))
                        .cloned()
                        .unwrap_or_default();

                    Primitive {
                        geometry: Geometry { vertices, indices },
                        material,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let mut out = MeshNode::with_primitives(&name, primitives);
    let decomposed = node.transform().decomposed();
    out.transform = Instance {
        position: decomposed.0.into(),
        rotation: decomposed.1.into(),
        scale: decomposed.2.into(),
    };

    for child in node.children() {
        out.add_child(to_mesh_node(child, buf, materials));
    }

    out
}
