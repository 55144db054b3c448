use std::ops::Range;

use wgpu::util::DeviceExt;

use super::geometry::MeshData;
use super::internal::MaterialBinder;
use super::material::Material;

/// One drawable: GPU vertex/index buffers plus the material they are shaded
/// with. Instances are addressed by their slot in the objects buffer.
pub struct MeshBatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: Material,
    material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
}

impl MeshBatch {
    pub(crate) fn new(
        device: &wgpu::Device,
        binder: &MaterialBinder,
        mesh: &MeshData,
        material: Material,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MeshVertexBuffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MeshIndexBuffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MaterialUniformBuffer"),
            contents: bytemuck::bytes_of(&material.uniform()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_bind_group = binder.bind(device, &material, &material_buffer);

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            material,
            material_buffer,
            material_bind_group,
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn is_multilayer(&self) -> bool {
        self.material.is_multilayer()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub(crate) fn bind_material(&self, pass: &mut wgpu::RenderPass<'_>, group: u32) {
        pass.set_bind_group(group, &self.material_bind_group, &[]);
    }

    fn bind_geometry(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Draws a single instance whose model matrix lives at `slot`.
    pub(crate) fn render(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        self.bind_geometry(pass);
        pass.draw_indexed(0..self.index_count, 0, slot..slot + 1);
    }

    /// One draw per instance slot, binding the geometry once.
    pub(crate) fn render_list(&self, pass: &mut wgpu::RenderPass<'_>, slots: Range<u32>) {
        if slots.is_empty() {
            return;
        }
        self.bind_geometry(pass);
        for slot in slots {
            pass.draw_indexed(0..self.index_count, 0, slot..slot + 1);
        }
    }

    /// Releases the buffers and every texture of the material.
    pub fn cleanup(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.material_buffer.destroy();
        self.material.cleanup();
    }
}
