//! Environment wrappers for observation transformations

use async_trait::async_trait;

use qlearn_core::{
    BoxObservationSpace, DiscreteAction, DiscreteSpace, Environment, Observation, Step, StepInfo,
};

/// A transformation applied to every observation leaving an environment
pub trait ObservationTransform<O: Observation>: Send + Sync {
    /// Map one observation to its transformed form
    fn transform(&mut self, observation: O) -> O;
}

impl<O, F> ObservationTransform<O> for F
where
    O: Observation,
    F: FnMut(O) -> O + Send + Sync,
{
    fn transform(&mut self, observation: O) -> O {
        self(observation)
    }
}

/// Wrapper that transforms observations
pub struct ObservationWrapper<E, T> {
    /// Inner environment
    pub env: E,
    /// Observation transformation
    pub transform: T,
}

impl<E, T> ObservationWrapper<E, T> {
    /// Wrap `env`, passing each observation it returns through `transform`
    pub fn new(env: E, transform: T) -> Self {
        Self { env, transform }
    }
}

#[async_trait]
impl<E, T> Environment for ObservationWrapper<E, T>
where
    E: Environment,
    T: ObservationTransform<E::Observation>,
{
    type Observation = E::Observation;

    fn observation_space(&self) -> BoxObservationSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> DiscreteSpace {
        self.env.action_space()
    }

    async fn reset(&mut self) -> qlearn_core::Result<(Self::Observation, StepInfo)> {
        let (observation, info) = self.env.reset().await?;
        Ok((self.transform.transform(observation), info))
    }

    async fn step(
        &mut self,
        action: DiscreteAction,
    ) -> qlearn_core::Result<Step<Self::Observation>> {
        let step = self.env.step(action).await?;
        let transform = &mut self.transform;
        Ok(step.map_observation(|o| transform.transform(o)))
    }

    async fn close(&mut self) -> qlearn_core::Result<()> {
        self.env.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CartPoleEnv;
    use qlearn_core::{EnvironmentConfig, VectorObservation};

    #[tokio::test]
    async fn test_transform_applies_to_reset_and_step() {
        let config = EnvironmentConfig {
            seed: Some(3),
            ..EnvironmentConfig::default()
        };
        let shift = |mut o: VectorObservation| {
            o.data[0] += 100.0;
            o
        };
        let mut env = ObservationWrapper::new(CartPoleEnv::new(&config), shift);

        let (obs, _) = env.reset().await.unwrap();
        assert!(obs.data[0] > 99.0);

        let step = env.step(DiscreteAction(0)).await.unwrap();
        assert!(step.observation.data[0] > 99.0);
        // the true state is untouched
        assert!(env.env.state().x.abs() < 1.0);
    }
}
