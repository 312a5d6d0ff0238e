//! Compiles a small deferred frame and runs it on the dummy device.
//!
//! ```bash
//! cargo run --example frame_schedule -- --frames 3 --no-copy-queue
//! RUST_LOG=debug cargo run --example frame_schedule
//! ```

use clap::Parser;

use fencegraph::backend::QueueRecorder;
use fencegraph::render_graph::TransientResource;
use fencegraph::{
    CompileConfig, DummyDevice, QueueType, RenderGraph, RenderNode, ResourceState,
    SyncCullingConfig, TextureFormat,
};

/// Frame schedule demo arguments.
#[derive(Parser, Debug)]
#[command(
    name = "frame_schedule",
    about = "Compile a multi-queue frame graph and execute it on the dummy device",
    version
)]
struct Args {
    /// Number of frames to execute.
    #[arg(long, default_value = "2")]
    frames: u64,

    /// Pretend the device has no async compute queue.
    #[arg(long)]
    no_async_compute: bool,

    /// Pretend the device has no dedicated copy queue.
    #[arg(long)]
    no_copy_queue: bool,

    /// Keep every cross-queue wait.
    #[arg(long)]
    no_culling: bool,

    /// Print the instruction stream recorded on every queue.
    #[arg(long)]
    streams: bool,
}

fn pass(name: &str, queue: QueueType, recorder: &QueueRecorder) -> RenderNode {
    let recorder = recorder.clone();
    RenderNode::new(name, queue).with_callback(move |ctx| {
        recorder.mark(ctx.queue, format!("{} (frame {})", ctx.name, ctx.frame));
        Ok(())
    })
}

fn build_graph(recorder: &QueueRecorder) -> RenderGraph {
    RenderGraph::new()
        .with_node(
            pass("upload", QueueType::Copy, recorder)
                .with_output("instances", "InstanceBuffer", ResourceState::CopyDest),
        )
        .with_node(
            pass("depth", QueueType::Main, recorder)
                .with_transient(TransientResource::texture(
                    "Depth",
                    1920,
                    1080,
                    TextureFormat::Depth32Float,
                ))
                .with_input("upload.instances", ResourceState::ShaderResource)
                .with_output("depth", "Depth", ResourceState::DepthWrite),
        )
        .with_node(
            pass("ao", QueueType::Compute, recorder)
                .with_transient(TransientResource::texture("Occlusion", 960, 540, TextureFormat::R8Unorm))
                .with_input("depth.depth", ResourceState::ShaderResource)
                .with_output("occlusion", "Occlusion", ResourceState::UnorderedAccess),
        )
        .with_node(
            pass("shadow", QueueType::Copy, recorder)
                .with_input("depth.depth", ResourceState::CopySource)
                .with_output("shadow", "ShadowCopy", ResourceState::CopyDest),
        )
        .with_node(
            pass("lighting", QueueType::Main, recorder)
                .with_input("depth.depth", ResourceState::DepthRead)
                .with_input("ao.occlusion", ResourceState::ShaderResource)
                .with_input("shadow.shadow", ResourceState::ShaderResource)
                .with_output("color", "SceneColor", ResourceState::RenderTarget),
        )
        .with_node(
            pass("present", QueueType::Main, recorder)
                .with_input("lighting.color", ResourceState::Present),
        )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let sync_culling = if args.no_culling {
        SyncCullingConfig::disabled()
    } else {
        SyncCullingConfig::default()
    };
    let config = CompileConfig::default()
        .with_async_compute(!args.no_async_compute)
        .with_dedicated_copy(!args.no_copy_queue)
        .with_sync_culling(sync_culling);

    let device = DummyDevice::new();
    let compiled = match build_graph(&device.recorder()).compile_with(&config) {
        Ok(compiled) => compiled,
        Err(err) => {
            log::error!("Failed to compile the frame graph: {}", err);
            std::process::exit(1);
        }
    };

    println!("{}", compiled.describe());
    for lifetime in compiled.resource_lifetimes() {
        let writes: Vec<u32> = lifetime.write_levels().collect();
        println!(
            "{:<16} levels {}..={}, written at {:?}, last read {:?}{}",
            lifetime.name(),
            lifetime.first_level(),
            lifetime.last_level(),
            writes,
            lifetime.last_read_level(),
            lifetime
                .transient()
                .map(|desc| format!(" transient, {} bytes", desc.size_in_bytes()))
                .unwrap_or_default()
        );
    }

    for _ in 0..args.frames {
        device.clear_commands();
        let frame = match compiled.execute(&device) {
            Ok(frame) => frame,
            Err(err) => {
                log::error!("Frame failed: {}", err);
                std::process::exit(1);
            }
        };
        if let Err(err) = frame.wait(&device) {
            log::error!("Frame {} never completed: {}", frame.frame, err);
            std::process::exit(1);
        }
        log::info!(
            "Frame {}: {} passes, {} waits, fences {:?}",
            frame.frame,
            frame.passes_executed,
            frame.waits_recorded,
            frame.signals
        );

        if args.streams {
            for queue in QueueType::ALL {
                println!("{queue}:");
                for command in device.commands(queue) {
                    println!("  {command:?}");
                }
            }
        }
    }
}
