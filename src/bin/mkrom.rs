use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use unsp_asm::video::{self, regs, SpriteColors, SpriteFlags, SpriteSize};
use unsp_asm::{AluOp, AsmConfig, Assembler, Cond, EncodeError, Register};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Build the GPIO/palette/sprite bring-up ROM image"
)]
struct Opts {
    /// Output ROM image (raw little-endian words)
    #[arg(short, long, default_value = "rom.bin")]
    output: PathBuf,
    /// Word address the code is emitted at (also the reset vector)
    #[arg(long, default_value_t = 0x6000)]
    origin: u32,
    /// Write the label map as JSON
    #[arg(long)]
    map: Option<PathBuf>,
    /// Reproduce truncating encodings instead of rejecting out-of-range values
    #[arg(long)]
    lenient: bool,
}

/// Emit code that fills one sprite attribute entry (4 words per sprite).
fn set_sprite(
    asm: &mut Assembler,
    i: u16,
    tile: u16,
    x: u16,
    y: u16,
    attr: u16,
) -> Result<(), EncodeError> {
    let entry = regs::SPRITE_TABLE + i * 4;
    asm.store_immediate(entry, tile)?;
    asm.store_immediate(entry + 1, x)?;
    asm.store_immediate(entry + 2, y)?;
    asm.store_immediate(entry + 3, attr)
}

/// 128x128 luminance gradient, brightening towards the bottom-right corner.
fn gradient_image() -> Vec<u8> {
    let mut image = vec![0u8; 128 * 128];
    for y in 0..128usize {
        for x in 0..128usize {
            let l = x as f32 / 128.0 * (y as f32 / 128.0);
            image[y * 128 + x] = (255.0 * l) as u8;
        }
    }
    image
}

fn build_rom(origin: u32, strict: bool) -> Result<(Assembler, BTreeMap<&'static str, u32>)> {
    let mut asm = Assembler::new(AsmConfig { strict });

    // Board identification words so the mask ROM treats the image as a
    // batman board (it has a simple GPIO port).
    for (addr, val) in regs::BOARD_IDENT {
        asm.mem.set_word(addr, val);
    }

    asm.set_origin(origin)?;

    // Main loop: poll the GPIO and test the UP key.
    let start = asm.here();
    asm.emit_load(Register::R1, regs::GPIO_IN)?;
    asm.emit_set(Register::R2, regs::GPIO_IN_UP)?;
    asm.emit_alu(AluOp::Test, Register::R1, Register::R2)?;

    // Dispatch: targets are not emitted yet, so reserve placeholders.
    // Each placeholder branches to itself so it encodes in range.
    let jump = asm.reserve(|a| {
        let next = a.here() + 1;
        a.emit_branch(Cond::NotEqual, next)
    })?;
    let to_red = asm.reserve(|a| a.emit_goto(0))?;
    let set_blue = asm.here();
    let to_blue = asm.reserve(|a| a.emit_goto(0))?;

    // Fill the palette with a red or blue gradient.
    let fill_red = asm.here();
    for i in 0..0x100u16 {
        let color = video::pack_rgba(i as u8, 0, 0, 0xFF);
        asm.store_immediate(regs::PALETTE_BASE + i, color)?;
    }
    let red_done = asm.reserve(|a| a.emit_goto(0))?;
    let fill_blue = asm.here();
    for i in 0..0x100u16 {
        let color = video::pack_rgba(0, 0, i as u8, 0xFF);
        asm.store_immediate(regs::PALETTE_BASE + i, color)?;
    }
    let fill_done = asm.here();

    // Fixup pass: every target is known now.
    asm.patch(jump, |a| a.emit_branch(Cond::NotEqual, set_blue))?;
    asm.patch(to_red, |a| a.emit_goto(fill_red))?;
    asm.patch(to_blue, |a| a.emit_goto(fill_blue))?;
    asm.patch(red_done, |a| a.emit_goto(fill_done))?;

    // Sprite tiles live at the bottom of memory.
    let sprite_base: u16 = 0x0000;
    asm.store_immediate(regs::SPRITE_SEGMENT, sprite_base / 0x40)?;

    // Tile the gradient into a 4x4 grid of 32x32 8bpp sprites, two pixels
    // per word, written into tile RAM by the emitted code itself.
    let image = gradient_image();
    let sprite_words = video::sprite_words(SpriteSize::S32, SpriteSize::S32, SpriteColors::Bpp8);
    let (cx, cy) = (4u16, 4u16);
    for y in 0..cy {
        for x in 0..cx {
            let tile = 1 + y * cx + x;
            for dy in 0..32u16 {
                for dx in (0..32u16).step_by(2) {
                    let image_xy = usize::from((y * 32 + dy) * 128 + (x * 32 + dx));
                    let sprite_xy = (dy * 32 + dx) / 2;
                    let packed =
                        (u16::from(image[image_xy]) << 8) | u16::from(image[image_xy + 1]);
                    asm.store_immediate(sprite_base + tile * sprite_words + sprite_xy, packed)?;
                }
            }
        }
    }

    // Place the sprites and switch them on.
    let attr = video::sprite_attr(
        1,
        SpriteSize::S32,
        SpriteSize::S32,
        SpriteColors::Bpp8,
        SpriteFlags::empty(),
    );
    for y in 0..cy {
        for x in 0..cx {
            let i = y * cx + x;
            set_sprite(
                &mut asm,
                i,
                1 + i,
                x * 32,
                (50 - i32::from(y) * 32) as u16,
                attr,
            )?;
        }
    }
    asm.store_immediate(regs::SPRITE_ENABLE, 0x0001)?;

    asm.emit_goto(start)?;

    // The hardware fetches the entry address from a fixed cell.
    asm.mem.set_word(regs::RESET_VECTOR, origin as u16);

    let labels = BTreeMap::from([
        ("start", start),
        ("set_blue", set_blue),
        ("fill_red", fill_red),
        ("fill_blue", fill_blue),
        ("fill_done", fill_done),
    ]);
    Ok((asm, labels))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let (asm, labels) = build_rom(opts.origin, !opts.lenient)?;

    tracing::info!("code emitted at {:#x}..{:#x}", opts.origin, asm.here());

    asm.mem.write_bin(&opts.output)?;
    tracing::info!(path = %opts.output.display(), "wrote ROM image");

    if let Some(map) = opts.map {
        std::fs::write(&map, serde_json::to_string_pretty(&labels)?)?;
        tracing::info!(path = %map.display(), "wrote label map");
    }
    Ok(())
}
