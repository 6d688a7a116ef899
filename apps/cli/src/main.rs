use anyhow::{Context, Result, bail};
use clap::Parser;
use pageboot_core::config::SimConfig;
use pageboot_core::hal::mock::MOCK_CRC;
use pageboot_core::protocol::{Message, RequestCode, ResultCode, u32_to_data};
use pageboot_core::sim::Simulator;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Page-oriented bootloader simulator", long_about = None)]
struct Args {
    /// Path to a TOML simulator configuration
    #[arg(long)]
    config: Option<String>,

    /// Path to an application image to flash (test pattern if omitted)
    #[arg(long)]
    image: Option<String>,

    /// Node id of the device to flash
    #[arg(long, default_value_t = 1)]
    node: u8,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(&args) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => SimConfig::load_from_file(path)
            .with_context(|| format!("Loading config from {path}"))?,
        None => SimConfig {
            devices: vec![Default::default()],
        },
    };
    let mut sim = config.build_simulator()?;
    info!(devices = sim.device_count(), "Simulated bus up");

    discover(&mut sim);

    let image = match &args.image {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Reading image from {path}"))?
        }
        None => test_pattern(),
    };

    flash_device(&mut sim, args.node, &image)?;
    start_app(&mut sim, args.node)?;
    Ok(())
}

/// Broadcast a ping and list every device that answers.
fn discover(sim: &mut Simulator) {
    sim.send_broadcast(&Message::new_request(RequestCode::Ping, 0));
    sim.update_devices();
    while let Some((node_id, response)) = sim.next_broadcast_response() {
        info!(
            node_id,
            version = format_args!(
                "{}.{}.{}",
                response.data[0], response.data[1], response.data[2]
            ),
            "Device answered ping"
        );
    }
}

/// Send one request and wait for a successful response.
fn transact(sim: &mut Simulator, node: u8, msg: &Message) -> Result<Message> {
    sim.send_to_node(node, msg)?;
    sim.update_devices();
    let response = sim
        .take_node_response(node)?
        .context("Device did not answer")?;
    match response.result_code() {
        Some(code) if code.is_ok() => Ok(response),
        Some(code) => bail!("Request {:#06X} failed: {code}", msg.request),
        None => bail!(
            "Request {:#06X} failed with unknown result {:#04X}",
            msg.request,
            response.result
        ),
    }
}

fn query_word(sim: &mut Simulator, node: u8, request: RequestCode) -> Result<u32> {
    Ok(transact(sim, node, &Message::new_request(request, 0))?.data_word())
}

/// Flash an application image page by page and store its CRC.
fn flash_device(sim: &mut Simulator, node: u8, image: &[u8]) -> Result<()> {
    let page_size = query_word(sim, node, RequestCode::FlashInfoPageSize)? as usize;
    let num_pages = query_word(sim, node, RequestCode::FlashInfoNumPages)?;
    let app_first_page = query_word(sim, node, RequestCode::AppInfoPageIdx)?;

    let app_bytes = (num_pages - app_first_page) as usize * page_size;
    if image.len() > app_bytes - 4 {
        bail!(
            "Image of {} bytes does not fit the {} byte app region",
            image.len(),
            app_bytes - 4
        );
    }

    // Pad to whole pages with erased bytes; the CRC slot stays 0xFF
    // until FlashWriteAppCrc patches it.
    let mut padded = image.to_vec();
    padded.resize(app_bytes, 0xFF);

    for (page_offset, page) in padded.chunks(page_size).enumerate() {
        let page_id = app_first_page + page_offset as u32;
        upload_page(sim, node, page)?;

        let staged_crc = query_word(sim, node, RequestCode::PageBufferCalcCrc)?;
        let expected = MOCK_CRC.checksum(page);
        if staged_crc != expected {
            bail!("Page {page_id} staged with bad CRC {staged_crc:#010X}");
        }

        let mut commit = Message::new_request(RequestCode::PageBufferWriteToFlash, 0);
        commit.set_data_word(page_id);
        transact(sim, node, &commit)?;
        debug!(page_id, "Page programmed");
    }

    // Checksum of everything the device will later verify.
    let app_crc = MOCK_CRC.checksum(&padded[..app_bytes - 4]);
    let mut store = Message::new_request(RequestCode::FlashWriteAppCrc, 0);
    store.set_data_word(app_crc);
    transact(sim, node, &store)?;
    info!(
        node,
        crc = format_args!("{app_crc:#010X}"),
        "Image flashed and CRC stored"
    );
    Ok(())
}

/// Stage one page into the device buffer, word by word.
fn upload_page(sim: &mut Simulator, node: u8, page: &[u8]) -> Result<()> {
    transact(sim, node, &Message::new_request(RequestCode::PageBufferClear, 0))?;
    for (word_idx, word) in page.chunks(4).enumerate() {
        let mut msg =
            Message::new_request(RequestCode::PageBufferWriteWord, (word_idx & 0xFF) as u8);
        msg.data.copy_from_slice(word);
        let response = transact(sim, node, &msg)?;
        if word_idx == page.len() / 4 - 1
            && response.result_code() != Some(ResultCode::OkPageFull)
        {
            bail!("Device did not acknowledge a full page buffer");
        }
    }
    Ok(())
}

/// Ask the device to verify the stored CRC and start the application.
fn start_app(sim: &mut Simulator, node: u8) -> Result<()> {
    transact(sim, node, &Message::new_request(RequestCode::StartApp, 0))?;
    let device = sim.device(node).context("Device vanished")?;
    match device.handler().hal().start_app_address() {
        Some(address) => {
            info!(node, address = format_args!("{address:#010X}"), "Application started");
            Ok(())
        }
        None => bail!("Device accepted StartApp but never jumped"),
    }
}

/// Deterministic pattern image used when no file is given.
fn test_pattern() -> Vec<u8> {
    let mut image = vec![0u8; 4 * 1024];
    for (idx, byte) in image.iter_mut().enumerate() {
        *byte = (idx % 251) as u8;
    }
    // Reset-vector-looking words at the start.
    image[..4].copy_from_slice(&u32_to_data(0x2000_2000));
    image[4..8].copy_from_slice(&u32_to_data(0x0800_0801));
    image
}
