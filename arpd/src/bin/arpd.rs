use std::error::Error;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{error, info};

use arpd::dump::{LogDump, NoDump};
use arpd::monitor::{keep_running, Ticker};
use arpd::{logger, ArpResponder, Config, ConfigError, Identity, Intake, Stats};
use arpd_pkt::ether::EtherAddr;
use arpd_port::{AfPacketPort, Mempool, MempoolConf, PortConf, PortStats};

const MP_NAME: &str = "arpd";

fn run(conf: Config) -> Result<(), Box<dyn Error>> {
    let mut mp_conf = MempoolConf::new();
    mp_conf.set_nb_mbufs(conf.nb_mbufs());
    let mempool = Mempool::create(MP_NAME, &mp_conf)?;

    let port = AfPacketPort::open(conf.iface(), mempool, &PortConf::new())?;
    let identity = Identity::new(EtherAddr(port.mac_addr()), conf.ip());
    info!(
        "port {} (index {}) mac {}",
        port.iface(),
        port.ifindex(),
        identity.ether_addr()
    );
    info!("my ip is {}", identity.ipv4_addr());

    let rxq = port.rx_queue()?;
    let txq = port.tx_queue()?;

    let run = Arc::new(AtomicBool::new(true));
    let run_clone = run.clone();
    ctrlc::set_handler(move || {
        run_clone.store(false, Ordering::Release);
    })?;

    let stats = Arc::new(Stats::new());
    let stats_clone = stats.clone();
    let run_clone = run.clone();
    let hexdump = conf.hexdump();
    let jh = std::thread::Builder::new()
        .name("arpd-rx".to_string())
        .spawn(move || {
            let responder = ArpResponder::new(&identity);
            let mut intake = Intake::new(rxq, txq, responder, &stats_clone);
            if hexdump {
                intake.run(&mut LogDump, &run_clone);
            } else {
                intake.run(&mut NoDump, &run_clone);
            }
        })?;

    monitor(&port, &stats, &run, &jh, conf.stats_interval());

    if jh.join().is_err() {
        return Err("receive thread panicked".into());
    }

    info!("total: {}", stats.snapshot());
    info!(
        "pool {}: {} of {} mbufs available",
        port.mempool().name(),
        port.mempool().available(),
        port.mempool().nb_mbufs()
    );
    Ok(())
}

// Print port and responder counters every `interval` until `run` is cleared or the
// receive thread exits.
fn monitor(
    port: &AfPacketPort,
    stats: &Stats,
    run: &AtomicBool,
    worker: &JoinHandle<()>,
    interval: Option<Duration>,
) {
    let stats_query = port.stats_query();
    let mut old_port = stats_query.query();
    let mut curr_port: PortStats = stats_query.query();
    let mut old = stats.snapshot();
    let mut ticker = Ticker::new(interval, Instant::now());

    while keep_running(run, worker) {
        std::thread::sleep(Duration::from_millis(100));
        if !ticker.tick(Instant::now()) {
            continue;
        }

        stats_query.update(&mut curr_port);
        let curr = stats.snapshot();
        info!(
            "rx: {} pkts, {} bytes, {} missed || tx: {} pkts, {} bytes, {} errors",
            curr_port.ipackets() - old_port.ipackets(),
            curr_port.ibytes() - old_port.ibytes(),
            curr_port.imissed() - old_port.imissed(),
            curr_port.opackets() - old_port.opackets(),
            curr_port.obytes() - old_port.obytes(),
            curr_port.oerrors() - old_port.oerrors(),
        );
        info!("{}", curr.since(&old));

        old_port = curr_port;
        old = curr;
    }
}

fn main() {
    let conf = match Config::from_args(std::env::args_os()) {
        Ok(conf) => conf,
        Err(ConfigError::Usage(e)) => e.exit(),
        Err(e) => {
            eprintln!("arpd: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logger::init(conf.log_level()) {
        eprintln!("arpd: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(conf) {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("arpd shutdown gracefully");
}
