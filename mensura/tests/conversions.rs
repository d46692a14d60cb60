//! End-to-end conversion scenarios over a realistic unit system

use mensura::{Error, Number, Quantity, Unit, UnitSystem};

struct World {
    system: UnitSystem,
    meter: Unit,
    foot: Unit,
    inch: Unit,
    acre: Unit,
    kelvin: Unit,
    celsius: Unit,
    second: Unit,
    hour: Unit,
}

fn world() -> World {
    let mut system = UnitSystem::new();

    let length = system.define_dimension("length", "L").unwrap();
    let time = system.define_dimension("time", "T").unwrap();
    let temperature = system.define_dimension("temperature", "Θ").unwrap();
    let area = length.pow(2, &mut system);
    system
        .derive_dimension(area, "area", Some("A"))
        .unwrap();

    let meter = system.define_unit(length, "meter", "m").unwrap();
    let foot = system.define_unit(length, "foot", "ft").unwrap();
    let inch = system.define_unit(length, "inch", "in").unwrap();
    let acre = system.define_unit(area, "acre", "ac").unwrap();
    let second = system.define_unit(time, "second", "s").unwrap();
    let hour = system.define_unit(time, "hour", "h").unwrap();
    let kelvin = system.define_unit(temperature, "kelvin", "K").unwrap();
    let celsius = system.define_unit(temperature, "celsius", "°C").unwrap();

    system
        .equate(Quantity::of(1, foot), Quantity::of(12, inch))
        .unwrap();
    system
        .equate(
            Quantity::new("0.3048".parse().unwrap(), meter),
            Quantity::of(1, foot),
        )
        .unwrap();
    let square_foot = foot.pow(2, &mut system);
    system
        .equate(Quantity::of(1, acre), Quantity::of(43560, square_foot))
        .unwrap();
    system
        .equate(Quantity::of(1, hour), Quantity::of(3600, second))
        .unwrap();
    system
        .translate(celsius, Quantity::new("273.15".parse().unwrap(), kelvin))
        .unwrap();

    World {
        system,
        meter,
        foot,
        inch,
        acre,
        kelvin,
        celsius,
        second,
        hour,
    }
}

#[test]
fn test_single_hop_lengths() {
    let mut w = world();
    let inches = w
        .system
        .convert(&Quantity::of(1, w.foot), w.inch)
        .unwrap();
    assert_eq!(inches.magnitude, Number::from_i64(12));
    assert_eq!(inches.unit, w.inch);
}

#[test]
fn test_squared_units_reuse_linear_edges() {
    let mut w = world();
    let square_foot = w.foot.pow(2, &mut w.system);
    let square_inch = w.inch.pow(2, &mut w.system);
    let feet = w
        .system
        .convert(&Quantity::of(144, square_inch), square_foot)
        .unwrap();
    assert_eq!(feet.magnitude, Number::from_i64(1));
}

#[test]
fn test_acre_to_square_inches() {
    let mut w = world();
    let square_inch = w.inch.pow(2, &mut w.system);
    let inches = w
        .system
        .convert(&Quantity::of(1, w.acre), square_inch)
        .unwrap();
    assert_eq!(inches.magnitude, Number::from_i64(6_272_640));
}

#[test]
fn test_square_meters_to_acre() {
    let mut w = world();
    let square_meter = w.meter.pow(2, &mut w.system);
    let acres = w
        .system
        .convert(
            &Quantity::new("4046.8564224".parse().unwrap(), square_meter),
            w.acre,
        )
        .unwrap();
    assert_eq!(acres.magnitude, Number::from_i64(1));
}

#[test]
fn test_temperature_offsets_both_ways() {
    let mut w = world();
    let freezing = w
        .system
        .convert(&Quantity::of(0, w.celsius), w.kelvin)
        .unwrap();
    assert_eq!(freezing.magnitude, "273.15".parse().unwrap());

    let zero = w
        .system
        .convert(&Quantity::new("273.15".parse().unwrap(), w.kelvin), w.celsius)
        .unwrap();
    assert_eq!(zero.magnitude, Number::zero());
}

#[test]
fn test_compound_ratio_units() {
    let mut w = world();
    let meters_per_second = w.meter.div(w.second, &mut w.system);
    let feet_per_second = w.foot.div(w.second, &mut w.system);
    let speed = w
        .system
        .convert(&Quantity::of(1, meters_per_second), feet_per_second)
        .unwrap();
    assert_eq!(speed.magnitude, Number::from_ratio(1250, 381).unwrap());
}

#[test]
fn test_prefixed_compound_to_base_ratio() {
    let mut w = world();
    let kilo = w.system.define_prefix(10, 3, "kilo", "k").unwrap();
    let kilometers_per_hour = w
        .meter
        .scale(kilo, &mut w.system)
        .div(w.hour, &mut w.system);
    let meters_per_second = w.meter.div(w.second, &mut w.system);
    let speed = w
        .system
        .convert(&Quantity::of(1, kilometers_per_hour), meters_per_second)
        .unwrap();
    assert_eq!(speed.magnitude, Number::from_ratio(5, 18).unwrap());
}

#[test]
fn test_quantity_arithmetic_across_declared_units() {
    let mut w = world();
    let total = Quantity::of(1, w.foot)
        .add(&Quantity::of(12, w.inch), &mut w.system)
        .unwrap();
    assert_eq!(total.magnitude, Number::from_i64(2));
    assert_eq!(total.unit, w.foot);

    assert!(Quantity::of(1, w.foot).eq_in(&Quantity::of(12, w.inch), &mut w.system));
    assert!(Quantity::of(1, w.acre).eq_in(
        &Quantity::of(6_272_640, w.inch.pow(2, &mut w.system)),
        &mut w.system
    ));
}

#[test]
fn test_exact_round_trips() {
    let mut w = world();
    let start = Quantity::new(Number::from_ratio(355, 113).unwrap(), w.meter);
    let there = w.system.convert(&start, w.inch).unwrap();
    let back = w.system.convert(&there, w.meter).unwrap();
    assert_eq!(back.magnitude, start.magnitude);

    let celsius = Quantity::new(Number::from_ratio(-40, 1).unwrap(), w.celsius);
    let kelvin = w.system.convert(&celsius, w.kelvin).unwrap();
    let again = w.system.convert(&kelvin, w.celsius).unwrap();
    assert_eq!(again.magnitude, celsius.magnitude);
}

#[test]
fn test_error_taxonomy_is_distinct() {
    let mut w = world();

    // commensurable but unconnected
    let length = w.system.dimension_named("length").unwrap();
    let cubit = w.system.define_unit(length, "cubit", "cb").unwrap();
    assert!(matches!(
        w.system.convert(&Quantity::of(1, w.meter), cubit),
        Err(Error::ConversionNotFound { .. })
    ));

    // incommensurable, regardless of declared edges
    assert!(matches!(
        w.system.convert(&Quantity::of(1, w.meter), w.second),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn test_caches_survive_and_invalidate() {
    let mut w = world();
    let _ = w.system.convert(&Quantity::of(1, w.foot), w.inch).unwrap();
    let settled = w.system.conversion_stats().searches;
    let _ = w.system.convert(&Quantity::of(9, w.foot), w.inch).unwrap();
    assert_eq!(w.system.conversion_stats().searches, settled);

    // declaring a new edge flushes memoized paths and they rebuild
    let length = w.system.dimension_named("length").unwrap();
    let fathom = w.system.define_unit(length, "fathom", "ftm").unwrap();
    w.system
        .equate(Quantity::of(1, fathom), Quantity::of(6, w.foot))
        .unwrap();
    let fathoms = w
        .system
        .convert(&Quantity::of(72, w.inch), fathom)
        .unwrap();
    assert_eq!(fathoms.magnitude, Number::from_i64(1));
    assert!(w.system.conversion_stats().searches > settled);
}

#[test]
fn test_late_dimension_keeps_old_conversions() {
    let mut w = world();
    let inches = w.system.convert(&Quantity::of(1, w.foot), w.inch).unwrap();
    assert_eq!(inches.magnitude, Number::from_i64(12));

    let information = w.system.define_dimension("information", "B").unwrap();
    let bit = w.system.define_unit(information, "bit", "b").unwrap();
    let byte = w.system.define_unit(information, "byte", "By").unwrap();
    w.system
        .equate(Quantity::of(8, bit), Quantity::of(1, byte))
        .unwrap();

    let still = w.system.convert(&Quantity::of(2, w.foot), w.inch).unwrap();
    assert_eq!(still.magnitude, Number::from_i64(24));
    let bits = w.system.convert(&Quantity::of(2, byte), bit).unwrap();
    assert_eq!(bits.magnitude, Number::from_i64(16));
}
