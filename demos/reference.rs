use buckline::prelude::*;

fn main() {
    std::fs::create_dir_all("data").unwrap();

    let converter = ConverterParameters {
        input_voltage: 10.0, // [V]
        inductance: 20e-6, // [H]
        capacitance: 1e-6, // [F]
        resistance: 10.0, // [Ω]
        frequency: 1e6, // [Hz]
        duty_ratio: 0.5,
    };

    let sim_params = converter.simulation_parameters(
        1e-9, // [s]
        250,
        1.5e-4, // [s]
    );

    let mut simulation = Simulation::new(SimulationDescriptor {
        solver: converter.solver(StageCoupling::Coupled),
        sim_params,
    }).unwrap();

    println!(
        "\n-- General Simulation Info --\n\
        # of steps:      {}\n\
        Δt:              {:<9.2e} s\n\
        horizon:         {:<9.2e} s\n\
        sampling start:  {:<9.2e} s\n",
        sim_params.nsteps(),
        sim_params.delta_t,
        sim_params.horizon,
        sim_params.sampling_start,
    );

    println!("-- Run Part 1 --");
    // reference duty ratio, save the full waveforms
    let output = simulation.run(RunDescriptor {
        verbose: true,
        save_settings: Some(SaveSettings {
            filename: "data/buck_reference.h5",
            save_type: SaveType::Full,
            overwrite: true,
        }),
        cancel: None,
    })
    .unwrap();
    println!("{}\n", output.steady_state_label());

    println!("-- Run Part 2 --");
    // move the duty ratio control to 25% and keep only the summary
    let percent = 25;
    let converter = converter.with_duty_percent(percent);
    *simulation.solver_mut() = converter.solver(StageCoupling::Coupled);
    println!("{}", buckline::converter::duty_label(percent));

    let output = simulation.run(RunDescriptor {
        verbose: true,
        save_settings: Some(SaveSettings {
            filename: "data/buck_reference.h5",
            save_type: SaveType::Summary,
            overwrite: false,
        }),
        cancel: None,
    })
    .unwrap();
    println!("{}", output.steady_state_label());
}
