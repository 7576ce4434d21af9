//! Pendulum swing-up solved with DDPG.
//!
//! Demonstrates the full training loop: exploration noise, the
//! observe/trigger learning gate, metrics tracking, periodic evaluation
//! and episode-stamped checkpoints.

use ndarray::{array, Array1};
use rand::Rng;
use std::f32::consts::PI;
use std::path::Path;

use talos::agent::{DdpgAgent, DdpgBuilder};
use talos::metrics::MetricsTracker;
use talos::optimizer::{Adam, OptimizerWrapper};

/// Pendulum environment - classic continuous control task
struct Pendulum {
    // State: [cos(theta), sin(theta), angular_velocity]
    theta: f32,
    theta_dot: f32,

    max_speed: f32,
    max_torque: f32,
    dt: f32,
    gravity: f32,
    mass: f32,
    length: f32,

    steps: usize,
    max_steps: usize,
}

impl Pendulum {
    fn new() -> Self {
        Pendulum {
            theta: 0.0,
            theta_dot: 0.0,
            max_speed: 8.0,
            max_torque: 2.0,
            dt: 0.05,
            gravity: 10.0,
            mass: 1.0,
            length: 1.0,
            steps: 0,
            max_steps: 200,
        }
    }

    fn reset(&mut self) -> Array1<f32> {
        let mut rng = rand::thread_rng();
        self.theta = rng.gen_range(-PI..PI);
        self.theta_dot = rng.gen_range(-1.0..1.0);
        self.steps = 0;
        self.state()
    }

    fn state(&self) -> Array1<f32> {
        array![self.theta.cos(), self.theta.sin(), self.theta_dot]
    }

    fn step(&mut self, action: &Array1<f32>) -> (Array1<f32>, f32, bool) {
        let torque = action[0].clamp(-self.max_torque, self.max_torque);

        let costs = angle_normalize(self.theta).powi(2)
            + 0.1 * self.theta_dot.powi(2)
            + 0.001 * torque.powi(2);

        let new_theta_dot = self.theta_dot
            + (-3.0 * self.gravity / (2.0 * self.length) * self.theta.sin()
                + 3.0 / (self.mass * self.length.powi(2)) * torque)
                * self.dt;
        let new_theta_dot = new_theta_dot.clamp(-self.max_speed, self.max_speed);

        self.theta += new_theta_dot * self.dt;
        self.theta_dot = new_theta_dot;
        self.steps += 1;

        (self.state(), -costs, self.steps >= self.max_steps)
    }
}

fn angle_normalize(angle: f32) -> f32 {
    let mut normalized = angle;
    while normalized > PI {
        normalized -= 2.0 * PI;
    }
    while normalized < -PI {
        normalized += 2.0 * PI;
    }
    normalized
}

fn evaluate(agent: &mut DdpgAgent, episodes: usize) -> f32 {
    let mut env = Pendulum::new();
    let mut total_reward = 0.0;

    for _ in 0..episodes {
        let mut state = env.reset();
        loop {
            let action = agent.act(state.view(), false).expect("evaluation action");
            let (next_state, reward, done) = env.step(&action);
            total_reward += reward;
            state = next_state;
            if done {
                break;
            }
        }
    }

    total_reward / episodes as f32
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let episodes = 300;
    let eval_every = 25;
    let checkpoint_every = 100;
    let checkpoint_dir = Path::new("checkpoints");

    let mut agent = DdpgBuilder::new(3, 1)
        .name("pendulum")
        .hidden_sizes(vec![256, 256])
        .optimizer(OptimizerWrapper::Adam(Adam::default()))
        .action_bounds(-2.0, 2.0)
        .buffer_size(100_000)
        .batch_size(128)
        .min_required_experience(1_000)
        .learn_every(4)
        .consecutive_learn_iterations(2)
        .build()?;

    let mut env = Pendulum::new();
    let mut tracker = MetricsTracker::new(10_000);

    println!("Training DDPG on pendulum swing-up");
    println!("State dim: 3, action dim: 1 in [-2, 2]");

    for episode in 1..=episodes {
        let mut state = env.reset();
        agent.reset();
        tracker.start_episode();

        loop {
            let action = agent.act(state.view(), true)?;
            let (next_state, reward, done) = env.step(&action);
            tracker.step(reward);

            agent.observe(state, action, reward, next_state.clone(), done);
            if let Some((critic_loss, actor_loss)) = agent.trigger_learn()? {
                tracker.record_losses(critic_loss, actor_loss);
            }

            state = next_state;
            if done {
                break;
            }
        }

        tracker.record_exploration(agent.exploration());
        tracker.end_episode();

        if episode % eval_every == 0 {
            let eval_reward = evaluate(&mut agent, 5);
            println!(
                "Episode {:4}: avg(100) = {:8.2}, eval = {:8.2}, critic loss = {:.4}, exploration = {:.3}",
                episode,
                tracker.avg_episode_reward(100).unwrap_or(f32::NAN),
                eval_reward,
                tracker.avg_critic_loss(100).unwrap_or(f32::NAN),
                agent.exploration(),
            );
        }

        if episode % checkpoint_every == 0 {
            let path = agent.save_checkpoint(checkpoint_dir, episode)?;
            println!("Saved checkpoint to {}", path.display());
        }
    }

    let final_reward = evaluate(&mut agent, 20);
    println!("\nFinal evaluation over 20 episodes: {:.2}", final_reward);

    agent.save_checkpoint(checkpoint_dir, episodes)?;
    tracker.save("pendulum_metrics.json")?;

    Ok(())
}
