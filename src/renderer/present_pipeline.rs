pub struct PresentPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub frame_bgl: wgpu::BindGroupLayout,    // group 0: texture + sampler
    pub viewport_bgl: wgpu::BindGroupLayout, // group 1: letterbox scale uniform
}

/// Pipeline drawing one fullscreen triangle textured with the frame.
pub fn create_present_pipeline(
    device: &wgpu::Device,
    output_format: wgpu::TextureFormat,
) -> PresentPipeline {
    let shader = device.create_shader_module(wgpu::include_wgsl!("shaders/present.wgsl"));

    let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("present_frame_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    // group 1: letterbox scale (16 bytes)
    let viewport_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("present_viewport_bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("present_pipeline_layout"),
        bind_group_layouts: &[&frame_bgl, &viewport_bgl],
        ..Default::default()
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("present_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[], // positions generated from vertex_index
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: output_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    PresentPipeline { pipeline, frame_bgl, viewport_bgl }
}

/// Per-axis scale that fits a `frame` sized image into `surface` without
/// distorting it.  The larger axis fills the surface; the other is
/// letterboxed.
pub fn letterbox_scale(frame: (u32, u32), surface: (u32, u32)) -> [f32; 4] {
    let (fw, fh) = (frame.0.max(1) as f32, frame.1.max(1) as f32);
    let (sw, sh) = (surface.0.max(1) as f32, surface.1.max(1) as f32);
    let fit = (sw / fw).min(sh / fh);
    [fw * fit / sw, fh * fit / sh, 0.0, 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterbox_matching_aspect_fills_surface() {
        assert_eq!(letterbox_scale((960, 720), (1920, 1440)), [1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn letterbox_wide_surface_pads_sides() {
        let [x, y, _, _] = letterbox_scale((960, 720), (1920, 720));
        assert_eq!(y, 1.0);
        assert_eq!(x, 0.5);
    }
}
