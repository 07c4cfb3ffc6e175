//! Classic control environments

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use qlearn_core::{
    BoxObservationSpace, DiscreteAction, DiscreteSpace, Environment, EnvironmentConfig, RLError,
    Result, Reward, Step, StepInfo, VectorObservation,
};

/// CartPole environment
pub struct CartPoleEnv {
    /// Current state
    state: CartPoleState,
    /// Configuration
    config: CartPoleConfig,
    /// Step count
    steps: usize,
    rng: StdRng,
}

/// Physical state of the cart and pole
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CartPoleState {
    /// Cart position
    pub x: f64,
    /// Cart velocity
    pub x_dot: f64,
    /// Pole angle
    pub theta: f64,
    /// Pole angular velocity
    pub theta_dot: f64,
}

/// Physical constants and episode limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartPoleConfig {
    /// Gravitational acceleration
    pub gravity: f64,
    /// Cart mass
    pub mass_cart: f64,
    /// Pole mass
    pub mass_pole: f64,
    /// Half the pole length
    pub length: f64,
    /// Magnitude of the push force
    pub force_mag: f64,
    /// Seconds between state updates
    pub tau: f64,
    /// Steps before the episode is truncated
    pub max_steps: usize,
    /// Cart position at which the episode fails
    pub x_threshold: f64,
    /// Pole angle (radians) at which the episode fails
    pub theta_threshold: f64,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length: 0.5,
            force_mag: 10.0,
            tau: 0.02,
            max_steps: 500,
            x_threshold: 2.4,
            theta_threshold: 12.0 * 2.0 * std::f64::consts::PI / 360.0,
        }
    }
}

impl CartPoleEnv {
    /// Create a new CartPole environment
    #[must_use]
    pub fn new(config: &EnvironmentConfig) -> Self {
        let mut cartpole = CartPoleConfig::default();
        if let Some(max_steps) = config.max_steps {
            cartpole.max_steps = max_steps;
        }
        Self::with_config(cartpole, config.seed)
    }

    /// Create a CartPole environment with explicit physics
    #[must_use]
    pub fn with_config(config: CartPoleConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: CartPoleState::default(),
            config,
            steps: 0,
            rng,
        }
    }

    /// Current physical state, without any sensor noise
    #[must_use]
    pub fn state(&self) -> CartPoleState {
        self.state
    }

    fn get_observation(&self) -> VectorObservation {
        VectorObservation {
            data: vec![
                self.state.x,
                self.state.x_dot,
                self.state.theta,
                self.state.theta_dot,
            ],
        }
    }

    fn is_failed(&self) -> bool {
        self.state.x.abs() > self.config.x_threshold
            || self.state.theta.abs() > self.config.theta_threshold
    }
}

#[async_trait]
impl Environment for CartPoleEnv {
    type Observation = VectorObservation;

    fn observation_space(&self) -> BoxObservationSpace {
        let high = vec![
            self.config.x_threshold * 2.0,
            f64::INFINITY,
            self.config.theta_threshold * 2.0,
            f64::INFINITY,
        ];
        let low = high.iter().map(|&x| -x).collect();

        BoxObservationSpace { low, high }
    }

    fn action_space(&self) -> DiscreteSpace {
        DiscreteSpace::new(2) // 0: push left, 1: push right
    }

    async fn reset(&mut self) -> Result<(Self::Observation, StepInfo)> {
        self.state = CartPoleState {
            x: self.rng.gen_range(-0.05..0.05),
            x_dot: self.rng.gen_range(-0.05..0.05),
            theta: self.rng.gen_range(-0.05..0.05),
            theta_dot: self.rng.gen_range(-0.05..0.05),
        };
        self.steps = 0;

        Ok((self.get_observation(), StepInfo::default()))
    }

    async fn step(&mut self, action: DiscreteAction) -> Result<Step<Self::Observation>> {
        let force = match action.0 {
            0 => -self.config.force_mag,
            1 => self.config.force_mag,
            other => return Err(RLError::InvalidAction(format!("Invalid action: {other}"))),
        };

        let cos_theta = self.state.theta.cos();
        let sin_theta = self.state.theta.sin();

        let total_mass = self.config.mass_cart + self.config.mass_pole;
        let pole_mass_length = self.config.mass_pole * self.config.length;

        let temp =
            (force + pole_mass_length * self.state.theta_dot.powi(2) * sin_theta) / total_mass;
        let theta_acc = (self.config.gravity * sin_theta - cos_theta * temp)
            / (self.config.length
                * (4.0 / 3.0 - self.config.mass_pole * cos_theta.powi(2) / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // Euler integration
        let dt = self.config.tau;
        self.state.x += dt * self.state.x_dot;
        self.state.x_dot += dt * x_acc;
        self.state.theta += dt * self.state.theta_dot;
        self.state.theta_dot += dt * theta_acc;

        self.steps += 1;

        let terminated = self.is_failed();
        let truncated = self.steps >= self.config.max_steps && !terminated;

        Ok(Step {
            observation: self.get_observation(),
            reward: Reward(1.0), // Reward of 1 for each step survived
            terminated,
            truncated,
            info: StepInfo::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(max_steps: usize) -> CartPoleEnv {
        CartPoleEnv::new(&EnvironmentConfig {
            seed: Some(42),
            max_steps: Some(max_steps),
            ..EnvironmentConfig::default()
        })
    }

    #[tokio::test]
    async fn test_reset_is_near_upright() {
        let mut env = seeded(500);
        let (obs, _) = env.reset().await.unwrap();

        assert_eq!(obs.data.len(), 4);
        assert!(obs.data.iter().all(|v| v.abs() < 0.05));
    }

    #[tokio::test]
    async fn test_same_seed_same_trajectory() {
        let mut a = seeded(500);
        let mut b = seeded(500);
        assert_eq!(a.reset().await.unwrap().0, b.reset().await.unwrap().0);

        for i in 0..20 {
            let action = DiscreteAction(i % 2);
            let sa = a.step(action).await.unwrap();
            let sb = b.step(action).await.unwrap();
            assert_eq!(sa.observation, sb.observation);
        }
    }

    #[tokio::test]
    async fn test_constant_push_terminates() {
        let mut env = seeded(500);
        env.reset().await.unwrap();

        let mut steps = 0;
        loop {
            let step = env.step(DiscreteAction(1)).await.unwrap();
            steps += 1;
            assert_eq!(step.reward, Reward(1.0));
            if step.terminated {
                assert!(!step.truncated);
                break;
            }
            assert!(steps < 500, "pole should fall under a constant push");
        }
    }

    #[tokio::test]
    async fn test_truncates_at_step_limit() {
        let mut env = seeded(3);
        env.reset().await.unwrap();

        let mut last = None;
        for i in 0..3 {
            last = Some(env.step(DiscreteAction(i % 2)).await.unwrap());
        }
        let last = last.unwrap();
        assert!(last.truncated);
        assert!(!last.terminated);
    }

    #[tokio::test]
    async fn test_invalid_action() {
        let mut env = seeded(500);
        env.reset().await.unwrap();

        let err = env.step(DiscreteAction(2)).await.unwrap_err();
        assert!(matches!(err, RLError::InvalidAction(_)));
    }
}
