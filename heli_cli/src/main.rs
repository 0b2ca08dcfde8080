mod cli;

use clap::Parser;
use eyre::{Result, WrapErr};
use heli_config::Config;
use heli_core::codec::TelemetryEvent;
use heli_core::model::{PlantParams, RigModel};
use heli_core::sim::SimCfg;
use heli_core::synth::PidfGains;
use heli_core::tf::TransferFunction;
use heli_core::transport::Transport;
use heli_hardware::SerialOpener;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = cli::Args::parse();

    let mut cfg = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut cfg, &args);
    cfg.validate().wrap_err("invalid configuration")?;

    let _log_guard = init_tracing(&cfg.logging)?;

    // One-shot diagnostic modes.
    if let Some(path) = &args.snapshot {
        return report_snapshot(path);
    }
    if let (Some(tss), Some(mp)) = (args.tss, args.mp) {
        return report_design_target(tss, mp);
    }

    run(&cfg, &args)
}

fn apply_overrides(cfg: &mut Config, args: &cli::Args) {
    if let Some(port) = &args.port {
        cfg.serial.port = port.clone();
    }
    if let Some(baud) = args.baud {
        cfg.serial.baud = baud;
    }
    if let Some(kp) = args.kp {
        cfg.controller.kp = kp;
    }
    if let Some(ki) = args.ki {
        cfg.controller.ki = ki;
    }
    if let Some(kd) = args.kd {
        cfg.controller.kd = kd;
    }
    if let Some(n) = args.n {
        cfg.controller.n = n;
    }
    if let Some(ts) = args.ts {
        cfg.controller.ts = ts;
    }
    if let Some(seed) = args.seed {
        cfg.simulator.seed = Some(seed);
    }
}

fn run(cfg: &Config, args: &cli::Args) -> Result<()> {
    let mut rig = RigModel::new(PlantParams::from(&cfg.plant));
    rig.set_equilibrium_angle_deg(args.equilibrium);
    let (a, b) = rig.linearization();
    tracing::info!(
        mech_a = a,
        mech_b = b,
        pwm_eq = rig.pwm_eq(),
        "rig linearized at {} deg",
        args.equilibrium
    );

    let gains = PidfGains::from(&cfg.controller);
    let coeffs = heli_core::synth::discretize(&gains, rig.pwm_eq())
        .wrap_err("controller discretization failed")?;
    tracing::info!(
        a0 = coeffs.a0,
        a1 = coeffs.a1,
        a2 = coeffs.a2,
        a4 = coeffs.a4,
        a5 = coeffs.a5,
        "discrete controller ready"
    );

    let mut transport = if args.simulate {
        Transport::simulated(SimCfg::from(&cfg.simulator), coeffs)
    } else {
        let opener = SerialOpener::new(
            cfg.serial.port.clone(),
            cfg.serial.baud,
            Duration::from_millis(cfg.serial.read_timeout_ms),
        );
        Transport::over_port(opener, coeffs)
            .with_poll_interval(Duration::from_millis(cfg.serial.poll_ms))
    };
    transport.set_reference_deg(args.reference);
    transport.start();

    let keep_going = Arc::new(AtomicBool::new(true));
    {
        let keep_going = Arc::clone(&keep_going);
        ctrlc::set_handler(move || keep_going.store(false, Ordering::SeqCst))
            .wrap_err("installing ctrl-c handler")?;
    }

    let started = Instant::now();
    let deadline = args.duration_ms.map(Duration::from_millis);
    loop {
        if !keep_going.load(Ordering::SeqCst) {
            break;
        }
        if let Some(limit) = deadline
            && started.elapsed() >= limit
        {
            break;
        }

        let batch = transport.drain(64);
        for event in &batch {
            print_event(event);
        }
        if batch.is_empty() && !transport.is_running() {
            // Worker gone (open failure or read fault) and queue drained.
            break;
        }
        std::thread::sleep(Duration::from_millis(args.drain_ms));
    }

    transport.stop();
    Ok(())
}

fn print_event(event: &TelemetryEvent) {
    let value = match event {
        TelemetryEvent::Data(f) => serde_json::json!({
            "type": "data",
            "angle_deg": f.angle_deg,
            "error_deg": f.error_deg,
            "pwm_hw": f.pwm_hw,
            "pwm_sw": f.pwm_sw,
        }),
        TelemetryEvent::Warning(text) => serde_json::json!({
            "type": "warning",
            "text": text,
        }),
        TelemetryEvent::TransportError(text) => serde_json::json!({
            "type": "transport_error",
            "text": text,
        }),
    };
    println!("{value}");
}

fn complex_pairs(roots: &[heli_core::tf::Complex64]) -> Vec<serde_json::Value> {
    roots
        .iter()
        .map(|r| serde_json::json!([r.re, r.im]))
        .collect()
}

fn report_design_target(tss: f64, mp: f64) -> Result<()> {
    let (target, zeta, wn) = heli_core::synth::pole_assignment(tss, mp)?;
    let report = serde_json::json!({
        "type": "design_target",
        "zeta": zeta,
        "wn": wn,
        "poles": complex_pairs(&target.poles()),
    });
    println!("{report}");
    Ok(())
}

fn report_snapshot(path: &std::path::Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading snapshot {}", path.display()))?;
    let snap = heli_config::ControllerSnapshot::from_json(&text)
        .wrap_err("parsing controller snapshot")?;
    let tf = TransferFunction::from_parts(&snap.c_num, &snap.c_den)?;
    let report = serde_json::json!({
        "type": "controller",
        "name": snap.ctrl,
        "poles": complex_pairs(&tf.poles()),
        "zeros": complex_pairs(&tf.zeros()),
    });
    println!("{report}");
    Ok(())
}

fn init_tracing(
    logging: &heli_config::Logging,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::EnvFilter;

    let default_level = logging.level.clone().unwrap_or_else(|| "info".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Some(file) = &logging.file {
        let path = std::path::Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let name = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("heli.log"));
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(writer)
            .init();
        Ok(Some(guard))
    } else {
        // Keep stdout clean for the JSON event stream.
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(None)
    }
}
