use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use winit::{dpi::PhysicalSize, window::Window};

use crate::asset::Assets;
use crate::error::{RenderError, Result};
use crate::renderer::frame::{DrawList, FramePlan, FrameState};
use crate::renderer::internal::{
    ColorPipelines, MaterialBinder, ObjectsBuffer, RenderContext, ShadowPass,
};
use crate::renderer::{Material, MeshBatch, MeshData, Texture};
use crate::scene::{Camera, Scene};
use crate::settings::RenderSettings;

const INITIAL_OBJECTS_CAPACITY: u32 = 1024;

/// Owns the GPU state and draws one frame at a time: shadow cascades when the
/// scene moved, then opaque meshes, terrain and sky.
pub struct FrameRenderer {
    context: RenderContext,
    objects: ObjectsBuffer,
    materials: MaterialBinder,
    shadows: ShadowPass,
    pipelines: ColorPipelines,
    frame: FrameState,
    settings: RenderSettings,
}

impl FrameRenderer {
    pub async fn new(window: Arc<Window>, settings: RenderSettings) -> Result<Self> {
        let context = RenderContext::new(window, &settings).await?;
        let objects = ObjectsBuffer::new(&context.device, INITIAL_OBJECTS_CAPACITY);
        let materials = MaterialBinder::new(&context.device, &context.queue);

        // Bad WGSL or pipeline state surfaces here rather than panicking.
        context.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shadows = ShadowPass::new(&context.device, &objects, settings.shadow_map_size);
        let pipelines = ColorPipelines::new(&context, &objects, &materials, &shadows);
        RenderError::check_scope(
            "failed to build render pipelines",
            context.device.pop_error_scope().await,
        )?;

        let frame = FrameState::new(&settings);

        Ok(Self {
            context,
            objects,
            materials,
            shadows,
            pipelines,
            frame,
            settings,
        })
    }

    /// Blocking form of [`FrameRenderer::new`].
    pub fn init(window: Arc<Window>, settings: RenderSettings) -> Result<Self> {
        pollster::block_on(Self::new(window, settings))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub fn frame_state(&self) -> &FrameState {
        &self.frame
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    pub fn create_mesh(&self, mesh: &MeshData, material: impl Into<Material>) -> MeshBatch {
        MeshBatch::new(&self.context.device, &self.materials, mesh, material.into())
    }

    pub fn load_texture(&self, path: impl AsRef<Path>) -> Result<Texture> {
        Texture::from_path(&self.context.device, &self.context.queue, path)
    }

    pub fn texture_from_image(&self, image: &RgbaImage, label: &str) -> Texture {
        Texture::from_image(&self.context.device, &self.context.queue, image, Some(label))
    }

    pub fn render(
        &mut self,
        camera: &Camera,
        scene: &Scene,
        assets: &Assets,
        scene_changed: bool,
    ) -> Result<()> {
        let frame = self.context.surface.get_current_texture()?;
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let size = self.context.size;
        let plan = self
            .frame
            .prepare(size.width, size.height, camera, scene, scene_changed);
        let draws = DrawList::from_scene(scene, |item| item.transform.matrix());

        self.objects.write(&self.context, &draws.objects);
        self.pipelines
            .write_scene(&self.context.queue, &self.frame.scene_uniforms(&plan, scene));
        if let Some(sky) = scene.sky() {
            self.pipelines
                .write_sky(&self.context.queue, &self.frame.sky_uniforms(&plan, sky));
        }

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("FrameEncoder"),
                });

        if plan.render_shadow_pass {
            self.shadows.render(
                &self.context,
                &mut encoder,
                self.frame.cascades(),
                assets,
                &draws,
                &self.objects,
            );
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ColorPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.context.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            set_viewport(&mut pass, &plan);
            self.record_scene(&mut pass, assets, &draws);
            self.record_terrain(&mut pass, assets, &draws);
            self.record_sky(&mut pass, scene, assets);
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn record_scene(&self, pass: &mut wgpu::RenderPass<'_>, assets: &Assets, draws: &DrawList) {
        if draws.batches.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipelines.scene);
        pass.set_bind_group(0, &self.pipelines.scene_bind_group, &[]);
        pass.set_bind_group(1, &self.objects.bind_group, &[]);
        for batch in &draws.batches {
            let Some(mesh) = assets.batch(batch.mesh) else {
                log::warn!("Skipping instances of unknown mesh {:?}", batch.mesh);
                continue;
            };
            mesh.bind_material(pass, 2);
            mesh.render_list(pass, batch.instances.clone());
        }
    }

    fn record_terrain(&self, pass: &mut wgpu::RenderPass<'_>, assets: &Assets, draws: &DrawList) {
        let Some((handle, slot)) = draws.terrain else {
            return;
        };
        let Some(mesh) = assets.batch(handle) else {
            log::warn!("Terrain mesh {:?} is not registered", handle);
            return;
        };
        pass.set_pipeline(&self.pipelines.terrain);
        pass.set_bind_group(0, &self.pipelines.scene_bind_group, &[]);
        pass.set_bind_group(1, &self.objects.bind_group, &[]);
        mesh.bind_material(pass, 2);
        mesh.render(pass, slot);
    }

    fn record_sky(&self, pass: &mut wgpu::RenderPass<'_>, scene: &Scene, assets: &Assets) {
        let Some(sky) = scene.sky() else {
            return;
        };
        let Some(mesh) = assets.mesh(sky.mesh) else {
            log::warn!("Sky mesh {:?} is not registered", sky.mesh);
            return;
        };
        pass.set_pipeline(&self.pipelines.sky);
        pass.set_bind_group(0, &self.pipelines.sky_bind_group, &[]);
        mesh.render(pass, 0);
    }

    /// Reconfigures the surface after it was lost or became outdated.
    pub fn recover_surface(&self) {
        self.context.reconfigure();
    }

    /// Releases every GPU resource the renderer created. Meshes are owned by
    /// [`Assets`] and released there.
    pub fn cleanup(self) {
        self.pipelines.cleanup();
        self.shadows.cleanup();
        self.materials.cleanup();
        self.objects.cleanup();
        self.context.depth.cleanup();
        log::info!("Renderer resources released");
    }
}

fn set_viewport(pass: &mut wgpu::RenderPass<'_>, plan: &FramePlan) {
    let (width, height) = plan.viewport;
    pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
}
