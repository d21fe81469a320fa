//! `inpaint-tools` CLI - preview masks, discount weights and flow colors.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{concatenate, s, Array4, ArrayView3, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inpaint_tools::dataset::{Dataset, DatasetConfig, Split};
use inpaint_tools::flow::{flow_to_image, Normalization};
use inpaint_tools::image::{
    hwc_to_image, load_image, save_image, save_mask, write_image, ImageTransform,
};
use inpaint_tools::mask::{
    mask_image, random_bbox, BboxConfig, BoundingBox, DiscountConfig, MaskConfig, MaskKind,
    SpatialDiscountMask,
};
use inpaint_tools::patches::local_patch;
use inpaint_tools::tensor::ImageBatch;
use inpaint_tools::timing::EpochTime;

/// Data utilities for image-inpainting GAN training.
#[derive(Parser, Debug)]
#[command(name = "inpaint-tools")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Random seed for reproducibility.
    #[arg(long, global = true, value_name = "INT")]
    seed: Option<u64>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cut a random hole into a single image.
    Mask(MaskArgs),
    /// Mask a sample of images from a dataset split.
    Sample(SampleArgs),
    /// Render a synthetic rotational flow field with the color wheel.
    Flow(FlowArgs),
    /// Render spatial discount weights as a grayscale image.
    Discount(DiscountArgs),
}

/// Hole geometry shared by the masking commands.
#[derive(clap::Args, Debug)]
struct HoleArgs {
    /// Side length images are resized to.
    #[arg(long, default_value = "256", value_name = "INT")]
    size: u32,

    /// Fill strategy: hole or mosaic.
    #[arg(long, default_value = "hole")]
    kind: MaskKind,

    /// Side length of the bounding box.
    #[arg(long, default_value = "128", value_name = "INT")]
    mask_size: usize,

    /// Maximum jitter; each side of the box shrinks by up to half of it.
    #[arg(long, default_value = "32", value_name = "INT")]
    max_delta: usize,

    /// Minimum distance between the box and the image border.
    #[arg(long, default_value = "0", value_name = "INT")]
    margin: usize,

    /// Draw the sampled bounding box on the output.
    #[arg(long)]
    outline: bool,

    /// Output JPEG quality (1-100).
    #[arg(short, long, default_value = "95", value_name = "INT")]
    quality: u8,
}

impl HoleArgs {
    fn bbox_config(&self, batch_same: bool) -> BboxConfig {
        let side = self.size as usize;
        BboxConfig {
            image: (side, side),
            mask: (self.mask_size, self.mask_size),
            margin: (self.margin, self.margin),
            batch_same,
        }
    }

    fn mask_config(&self) -> MaskConfig {
        MaskConfig {
            max_delta: (self.max_delta, self.max_delta),
            kind: self.kind,
            ..MaskConfig::default()
        }
    }
}

#[derive(clap::Args, Debug)]
struct MaskArgs {
    /// Input image path.
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output image path.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Also save the binary mask to this path.
    #[arg(long, value_name = "PATH")]
    mask_output: Option<PathBuf>,

    #[command(flatten)]
    hole: HoleArgs,
}

#[derive(clap::Args, Debug)]
struct SampleArgs {
    /// Directory holding all datasets.
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Dataset directory name under ROOT.
    #[arg(value_name = "NAME")]
    name: String,

    /// Directory to write masked previews to.
    #[arg(value_name = "OUT_DIR")]
    out_dir: PathBuf,

    /// Dataset split: train, val or test.
    #[arg(long, default_value = "val")]
    split: Split,

    /// Number of images to process.
    #[arg(short, long, default_value = "16", value_name = "INT")]
    count: usize,

    /// Images per batch.
    #[arg(long, default_value = "8", value_name = "INT")]
    batch_size: usize,

    /// Images sit directly in the split directory.
    #[arg(long)]
    no_sub_folder: bool,

    /// Also save the ground-truth crop under each box.
    #[arg(long)]
    crops: bool,

    #[command(flatten)]
    hole: HoleArgs,
}

#[derive(clap::Args, Debug)]
struct FlowArgs {
    /// Output image path.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Side length of each flow field.
    #[arg(long, default_value = "128", value_name = "INT")]
    size: usize,

    /// Number of fields, each spinning faster than the previous one.
    #[arg(long, default_value = "3", value_name = "INT")]
    samples: usize,

    /// Magnitude normalization: running or batch.
    #[arg(long, default_value = "running")]
    normalization: Normalization,
}

#[derive(clap::Args, Debug)]
struct DiscountArgs {
    /// Output image path.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Per-pixel decay factor.
    #[arg(long, default_value = "0.9", value_name = "FLOAT")]
    gamma: f64,

    /// Mask height.
    #[arg(long, default_value = "128", value_name = "INT")]
    height: usize,

    /// Mask width.
    #[arg(long, default_value = "128", value_name = "INT")]
    width: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("inpaint_tools={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let mut rng = args
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    match &args.command {
        Command::Mask(cmd) => run_mask(cmd, &mut rng),
        Command::Sample(cmd) => run_sample(cmd, &mut rng),
        Command::Flow(cmd) => run_flow(cmd),
        Command::Discount(cmd) => run_discount(cmd),
    }
}

fn run_mask(args: &MaskArgs, rng: &mut StdRng) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let transform = ImageTransform { normalize: false };
    let image = load_image(&args.input, args.hole.size).context("Failed to load input")?;
    let batch = transform.transform(&image).insert_axis(Axis(0));

    let boxes =
        random_bbox(rng, 1, &args.hole.bbox_config(true)).context("Invalid box geometry")?;
    let (masked, mask) = mask_image(rng, &batch.view(), &boxes, &args.hole.mask_config())
        .context("Failed to mask image")?;

    let preview = render(&transform, &masked, 0, args.hole.outline.then_some(boxes[0]))?;
    write_image(&preview, &args.output, args.hole.quality).context("Failed to save output")?;

    if let Some(path) = &args.mask_output {
        save_mask(&mask.slice(s![0, 0, .., ..]), path).context("Failed to save mask")?;
    }

    println!(
        "Successfully masked {} -> {}",
        args.input.display(),
        args.output.display()
    );

    Ok(())
}

fn run_sample(args: &SampleArgs, rng: &mut StdRng) -> Result<()> {
    let started = Instant::now();

    let config = DatasetConfig {
        root: args.root.clone(),
        name: args.name.clone(),
        split: args.split,
        sub_folder: !args.no_sub_folder,
        image_size: args.hole.size,
        transform: ImageTransform { normalize: false },
    };
    let transform = config.transform;
    let dataset = Dataset::open(config, rng).context("Failed to open dataset")?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let total = args.count.min(dataset.len());
    let indices: Vec<usize> = (0..total).collect();
    let bbox_config = args.hole.bbox_config(false);
    let mask_config = args.hole.mask_config();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Masking [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    for chunk in indices.chunks(args.batch_size.max(1)) {
        let batch = dataset.batch(chunk).context("Failed to load batch")?;
        let boxes =
            random_bbox(rng, chunk.len(), &bbox_config).context("Invalid box geometry")?;
        let (masked, _) = mask_image(rng, &batch.view(), &boxes, &mask_config)
            .context("Failed to mask batch")?;
        let crops = if args.crops {
            Some(local_patch(&batch.view(), &boxes).context("Failed to crop boxes")?)
        } else {
            None
        };

        for (i, &index) in chunk.iter().enumerate() {
            let outline = args.hole.outline.then_some(boxes[i]);
            let preview = render(&transform, &masked, i, outline)?;
            write_image(
                &preview,
                args.out_dir.join(format!("{index:04}.png")),
                args.hole.quality,
            )?;

            if let Some(crops) = &crops {
                let hwc = transform.detransform(&crops.slice(s![i, .., .., ..]));
                save_image(
                    &hwc.view(),
                    args.out_dir.join(format!("{index:04}_crop.png")),
                    args.hole.quality,
                )?;
            }

            pb.inc(1);
        }
    }

    pb.finish_with_message("Masking complete");

    tracing::info!(
        "Wrote {total} previews to {} in {}",
        args.out_dir.display(),
        EpochTime::between(started, Instant::now())
    );

    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn run_flow(args: &FlowArgs) -> Result<()> {
    let center = (args.size as f32 - 1.0) / 2.0;
    let flow = Array4::from_shape_fn((args.samples, args.size, args.size, 2), |(n, y, x, c)| {
        let speed = (n + 1) as f32;
        let (dy, dx) = (y as f32 - center, x as f32 - center);
        if c == 0 {
            -dy * speed
        } else {
            dx * speed
        }
    });

    let images =
        flow_to_image(&flow.view(), args.normalization).context("Failed to color flow")?;
    let tiles: Vec<ArrayView3<'_, f32>> = images.outer_iter().collect();
    let strip = concatenate(Axis(1), &tiles).context("No flow samples to render")?;

    save_image(&strip.view(), &args.output, 95).context("Failed to save output")?;
    println!("Rendered {} flow fields -> {}", args.samples, args.output.display());

    Ok(())
}

fn run_discount(args: &DiscountArgs) -> Result<()> {
    let mask = SpatialDiscountMask::new(DiscountConfig {
        gamma: args.gamma,
        height: args.height,
        width: args.width,
        enabled: true,
    })
    .context("Invalid discount configuration")?;

    save_mask(&mask.weights().slice(s![0, 0, .., ..]), &args.output)
        .context("Failed to save output")?;
    println!("Rendered discount mask -> {}", args.output.display());

    Ok(())
}

/// Convert sample `index` of a `[0, 1]` batch to an image, optionally
/// outlining a bounding box.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn render(
    transform: &ImageTransform,
    batch: &ImageBatch,
    index: usize,
    outline: Option<BoundingBox>,
) -> Result<DynamicImage> {
    let hwc = transform.detransform(&batch.slice(s![index, .., .., ..]));
    let mut img: RgbImage = hwc_to_image(&hwc.view())?;

    if let Some(bbox) = outline.filter(|b| b.width > 0 && b.height > 0) {
        // Safe: box coordinates lie within a u32-sized image
        let rect = Rect::at(bbox.left as i32, bbox.top as i32)
            .of_size(bbox.width as u32, bbox.height as u32);
        draw_hollow_rect_mut(&mut img, rect, Rgb([255, 0, 0]));
    }

    Ok(DynamicImage::ImageRgb8(img))
}
