use crate::core::car::Car;
use crate::core::level::{Checkpoint, Level};
use std::collections::HashMap;

/// * `lap_num` - Number of completed laps
/// * `checkpoint_idx` - Index of the last checkpoint reached in the current lap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressInfo {
    pub lap_num: u32,
    pub checkpoint_idx: usize,
}

/// ProgressUpdate tells the caller what happened to a car in `Progress::update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    Unchanged,
    Advanced,
    NewLap,
}

/// Progress derives lap and checkpoint information from the car positions. Cars only advance to
/// the checkpoint directly following their current one, so cutting the track does not pay off.
#[derive(Debug, Default)]
pub struct Progress {
    initialized: bool,
    checkpoints: Vec<Checkpoint>,
    cars: HashMap<String, ProgressInfo>,
}

impl Progress {
    pub fn new() -> Progress {
        Progress::default()
    }

    /// The method loads the checkpoints of the level. It must be called before any other method.
    pub fn initialize(&mut self, level: &dyn Level) {
        assert!(
            level.checkpoints().len() >= 2,
            "Level {} must provide at least two checkpoints!",
            level.name()
        );

        self.checkpoints = level.checkpoints().to_vec();
        self.cars.clear();
        self.initialized = true;
    }

    /// The method forgets checkpoints and cars.
    pub fn destroy(&mut self) {
        self.checkpoints.clear();
        self.cars.clear();
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // CARS ----------------------------------------------------------------------------------------
    pub fn add_car(&mut self, car: &Car) {
        self.assert_initialized();
        let prev = self
            .cars
            .insert(car.owner().to_owned(), ProgressInfo::default());
        assert!(prev.is_none(), "Car of {} was added twice!", car.owner());
    }

    pub fn remove_car(&mut self, car: &Car) {
        self.assert_initialized();
        assert!(
            self.cars.remove(car.owner()).is_some(),
            "Car of {} was never added!",
            car.owner()
        );
    }

    pub fn contains(&self, car: &Car) -> bool {
        self.cars.contains_key(car.owner())
    }

    // QUERIES -------------------------------------------------------------------------------------
    pub fn progress_info(&self, car: &Car) -> ProgressInfo {
        self.assert_initialized();
        *self
            .cars
            .get(car.owner())
            .unwrap_or_else(|| panic!("Car of {} is unknown to the progress tracker!", car.owner()))
    }

    pub fn lap_number(&self, car: &Car) -> u32 {
        self.progress_info(car).lap_num
    }

    pub fn checkpoint(&self, car: &Car) -> &Checkpoint {
        let idx = self.progress_info(car).checkpoint_idx;
        &self.checkpoints[idx]
    }

    pub fn checkpoint_at(&self, idx: usize) -> &Checkpoint {
        self.assert_initialized();
        &self.checkpoints[idx]
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    /// race_progress returns the progress of the car in laps, i.e. completed laps plus the
    /// fraction of the current lap given by the checkpoint index.
    pub fn race_progress(&self, car: &Car) -> f64 {
        let info = self.progress_info(car);
        info.lap_num as f64 + info.checkpoint_idx as f64 / self.checkpoints.len() as f64
    }

    /// nearest_checkpoint returns the index of the checkpoint closest to the car (the first one
    /// in case of a tie).
    pub fn nearest_checkpoint(&self, car: &Car) -> usize {
        self.assert_initialized();
        let pos = car.position();

        let mut idx_min = 0;
        let mut dist_min = f64::INFINITY;

        for chkpt in self.checkpoints.iter() {
            let dist = chkpt.position.dist(&pos);
            if dist < dist_min {
                dist_min = dist;
                idx_min = chkpt.idx;
            }
        }

        idx_min
    }

    // UPDATE --------------------------------------------------------------------------------------
    /// The method maps the car onto its nearest checkpoint and updates its progress accordingly.
    pub fn update(&mut self, car: &Car) -> ProgressUpdate {
        let idx = self.nearest_checkpoint(car);
        self.update_checkpoint(car, idx)
    }

    /// The method handles the car reaching the checkpoint with the inserted index. Only the
    /// checkpoint following the current one is accepted, reaching checkpoint 0 from the last one
    /// completes a lap. Every other index is ignored.
    pub fn update_checkpoint(&mut self, car: &Car, idx: usize) -> ProgressUpdate {
        self.assert_initialized();
        let no_checkpoints = self.checkpoints.len();

        let info = self
            .cars
            .get_mut(car.owner())
            .unwrap_or_else(|| panic!("Car of {} is unknown to the progress tracker!", car.owner()));

        let next_idx = (info.checkpoint_idx + 1) % no_checkpoints;

        if idx != next_idx {
            return ProgressUpdate::Unchanged;
        }

        info.checkpoint_idx = next_idx;

        if next_idx == 0 {
            info.lap_num += 1;
            ProgressUpdate::NewLap
        } else {
            ProgressUpdate::Advanced
        }
    }

    fn assert_initialized(&self) {
        assert!(self.initialized, "Progress tracker was not initialized!");
    }
}
