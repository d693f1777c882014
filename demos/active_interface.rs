use netspeed::interface::parse_counters;
use netspeed::routing::parse_route_device;
use netspeed::{CounterReader, InterfaceResolver, IpRouteQuery, RouteQuery};

fn main() -> netspeed::Result<()> {
    let output = IpRouteQuery::new().route_output()?;
    println!("Route query output: {}", output.trim());
    println!("Egress device token: {:?}", parse_route_device(&output));

    let Some(iface) = InterfaceResolver::default().resolve() else {
        println!("No internet-facing interface (virtual devices are ignored)");
        return Ok(());
    };
    println!("Active interface: {iface}");

    let (rx, tx) = CounterReader::default().read_counters(&iface);
    println!("  RX Bytes: {rx}");
    println!("  TX Bytes: {tx}");

    let table = std::fs::read_to_string(netspeed::interface::PROC_NET_DEV)?;
    println!("  Parsed directly: {:?}", parse_counters(&table, &iface));

    Ok(())
}
