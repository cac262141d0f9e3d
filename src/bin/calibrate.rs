//! Interactive calibration wizard. Walks the user through short recording
//! windows per gesture, derives personalized thresholds from the statistics,
//! and folds the accepted recommendations into the saved config.
//!
//! Run with no arguments for the full suite, or name a single gesture:
//! `calibrate punch|jump|turn|walking`.

use std::{
    io::{self, Write},
    process::exit,
    thread,
    time::Duration,
};

use silkmotion::{
    calibration::{
        AZIMUTH_WAIT, Gesture, IMPULSE_WINDOW, JUMP_STDDEV_FACTOR, PUNCH_STDDEV_FACTOR,
        SAMPLES_PER_GESTURE, SANITY_FLOOR_ACCEL, TURN_WINDOW, WALK_WINDOW,
        derive_impulse_threshold, derive_turn_threshold, derive_walking_params, mean,
        record_impulse_peaks, record_max_turn, record_step_times, wait_for_azimuth,
    },
    config::Config,
    net::UdpSource,
};

fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            exit(1);
        }
    };

    let mut source = match UdpSource::bind(&config.network) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("\n{}", "=".repeat(60));
            eprintln!("ERROR: {e:#}");
            eprintln!("{}", "=".repeat(60));
            exit(2);
        }
    };

    println!("{}", "=".repeat(50));
    println!(" Welcome to the Silkmotion Calibrator");
    println!("{}", "=".repeat(50));
    println!("\nThis tool will personalize the controller to your unique movements.");
    println!("Please follow the on-screen instructions carefully.");

    let gestures: Vec<Gesture> = match std::env::args().nth(1) {
        Some(name) => match Gesture::parse(&name) {
            Some(gesture) => {
                println!("\nCalibrating specific gesture: {name}");
                vec![gesture]
            }
            None => {
                eprintln!("Unknown gesture: {name}");
                eprintln!("Valid options: punch, jump, turn, walking");
                exit(3);
            }
        },
        None => vec![
            Gesture::Punch,
            Gesture::Jump,
            Gesture::Walking,
            Gesture::Turn,
        ],
    };

    let mut builder = config.thresholds.rebuild();
    for gesture in gestures {
        builder = match gesture {
            Gesture::Punch => match calibrate_punch(&mut source, config.thresholds.punch_xy_accel)
            {
                Some(threshold) => builder.punch_xy_accel(threshold),
                None => builder,
            },
            Gesture::Jump => match calibrate_jump(&mut source, config.thresholds.jump_z_accel) {
                Some(threshold) => builder.jump_z_accel(threshold),
                None => builder,
            },
            Gesture::Turn => match calibrate_turn(&mut source) {
                Some(threshold) => builder.turn_degrees(threshold),
                None => builder,
            },
            Gesture::Walking => match calibrate_walking(&mut source) {
                Some((debounce, timeout)) => builder.walking(debounce, timeout),
                None => builder,
            },
        };
    }

    println!("\n--- Calibration Complete! ---");
    let mut updated = config;
    updated.thresholds = builder.build();
    if let Err(e) = updated.save() {
        eprintln!("Failed to save config: {e}");
        exit(4);
    }
    println!("\nConfiguration saved successfully!");
}

fn show_instructions(message: &str) {
    println!("\n{}", "=".repeat(50));
    println!("{message}");
    println!("{}", "=".repeat(50));
    wait_for_enter("Press [Enter] when you are ready to continue...");
}

fn wait_for_enter(prompt: &str) {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}

fn countdown() {
    println!("Get ready...");
    thread::sleep(Duration::from_secs(1));
    println!("GO!");
}

/// Record impulse peaks, keeping only the values above the sanity floor.
/// Low readings get reported so the user can redo the motion sharper.
fn record_valid_peaks(
    source: &mut UdpSource,
    gesture_name: &str,
    pick: impl Fn((f32, f32)) -> f32,
) -> Vec<f32> {
    let mut peaks = Vec::new();
    for i in 0..SAMPLES_PER_GESTURE {
        wait_for_enter(&format!(
            "\nPress [Enter] when you are ready for {gesture_name} {} of {SAMPLES_PER_GESTURE}...",
            i + 1
        ));
        countdown();

        let peak = pick(record_impulse_peaks(source, IMPULSE_WINDOW));
        if peak < SANITY_FLOOR_ACCEL {
            println!(
                "  > Recorded a peak of {peak:.2} m/s². That seems low. \
                 Please try again with a sharper motion."
            );
            continue;
        }

        println!("  > Recorded a peak of {peak:.2} m/s². Good!");
        peaks.push(peak);
    }
    peaks
}

fn calibrate_punch(source: &mut UdpSource, previous: f32) -> Option<f32> {
    show_instructions(
        "--- Calibrating PUNCH ---\n\n\
         First, adopt your COMBAT STANCE.\n\
         Most users hold the phone like a handle or sword grip, with the\n\
         screen facing sideways (e.g., to your left if right-handed).\n\n\
         We will record 3 sharp, forward PUNCH motions from this stance.",
    );

    let peaks = record_valid_peaks(source, "Punch", |(_z, xy)| xy);
    let Some(threshold) = derive_impulse_threshold(&peaks, PUNCH_STDDEV_FACTOR) else {
        println!("\nNot enough valid samples to calibrate. Please try again.");
        return None;
    };

    println!("\n--- Analysis Complete ---");
    println!("Average Peak Punch: {:.2} m/s²", mean(&peaks));
    println!("Previous Threshold: {previous:.2}");
    println!("New Recommended Threshold: {threshold:.2}");
    Some(threshold)
}

fn calibrate_jump(source: &mut UdpSource, previous: f32) -> Option<f32> {
    show_instructions(
        "--- Calibrating JUMP ---\n\n\
         For this, adopt a NEUTRAL STANCE.\n\
         Hold the phone flat like a plate, with the screen facing UP.\n\n\
         We will record 3 sharp, upward HOP motions from this stance.",
    );

    let peaks = record_valid_peaks(source, "Jump", |(z, _xy)| z);
    let Some(threshold) = derive_impulse_threshold(&peaks, JUMP_STDDEV_FACTOR) else {
        println!("\nNot enough valid samples to calibrate jump. Please try again.");
        return None;
    };

    println!("\n--- Jump Analysis Complete ---");
    println!("Average Peak Jump: {:.2} m/s²", mean(&peaks));
    println!("Previous Threshold: {previous:.2}");
    println!("New Recommended Threshold: {threshold:.2}");
    Some(threshold)
}

fn calibrate_turn(source: &mut UdpSource) -> Option<f32> {
    show_instructions(
        "--- Calibrating TURN ---\n\n\
         This will measure a full 180-degree body turn.\n\n\
         1. Adopt your TRAVEL STANCE (how you hold the phone when walking).\n\
         2. When I say 'GO!', you will have 3 seconds to turn around completely.\n\
         3. You can turn either left or right, whichever is comfortable.",
    );

    let mut magnitudes = Vec::new();
    for i in 0..SAMPLES_PER_GESTURE {
        wait_for_enter(&format!(
            "\nPress [Enter] when ready for Turn Sample {} of {SAMPLES_PER_GESTURE}...",
            i + 1
        ));

        println!("  > Get ready... Don't move.");
        thread::sleep(Duration::from_secs(1));
        let Some(start_azimuth) = wait_for_azimuth(source, AZIMUTH_WAIT) else {
            println!("\n  ERROR: No rotation_vector data received!");
            println!("  Make sure your phone app is sending rotation_vector sensor data.");
            continue;
        };
        println!("  > Starting direction locked ({start_azimuth:.1}°). GO!");

        let max_turn = record_max_turn(source, start_azimuth, TURN_WINDOW);
        println!("  > Recorded a maximum turn of {max_turn:.1}°. Good!");
        magnitudes.push(max_turn);
    }

    let Some(threshold) = derive_turn_threshold(&magnitudes) else {
        println!("\nNot enough valid samples. Aborting turn calibration.");
        return None;
    };

    println!("\n--- Turn Analysis Complete ---");
    println!("Average Measured Turn: {:.1}°", mean(&magnitudes));
    println!("New Recommended Turn Threshold: {threshold:.1}°");
    Some(threshold)
}

fn calibrate_walking(source: &mut UdpSource) -> Option<(f32, f32)> {
    show_instructions(
        "--- Calibrating WALKING ---\n\n\
         Please remain in your TRAVEL STANCE.\n\n\
         We will record your natural walking pace for 10 seconds.\n\
         This sets how quickly steps are accepted and how long the walk\n\
         hold survives between them.",
    );
    println!("Get ready to walk in place at a comfortable, natural pace.");
    thread::sleep(Duration::from_secs(1));
    println!("GO!");

    let steps = record_step_times(source, WALK_WINDOW);
    println!("  > Recording complete! Detected {} steps.", steps.len());

    let Some((debounce, timeout)) = derive_walking_params(&steps) else {
        println!("Not enough steps detected to calibrate. Please try again.");
        return None;
    };

    println!("\n--- Walking Analysis Complete ---");
    println!("New Step Debounce: {debounce:.2}s");
    println!("New Walk Timeout:  {timeout:.2}s");
    Some((debounce, timeout))
}
