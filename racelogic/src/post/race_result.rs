use helpers::general::{argsort, SortOrder};

/// RaceResult contains all race information that is required for post-processing the results.
/// Lap and race times are stored per player from lap 1 on (index 0 holds 0.0), only for the laps
/// the player actually completed.
#[derive(Debug, Clone)]
pub struct RaceResult {
    pub tot_no_laps: u32,
    pub player_names: Vec<String>,
    pub laptimes: Vec<Vec<f64>>,
    pub racetimes: Vec<Vec<f64>>,
}

impl RaceResult {
    /// The method creates the result from the race times (s) at which each player completed its
    /// laps.
    pub fn new(tot_no_laps: u32, player_names: Vec<String>, lap_racetimes: &[Vec<f64>]) -> RaceResult {
        let mut laptimes = Vec::with_capacity(lap_racetimes.len());
        let mut racetimes = Vec::with_capacity(lap_racetimes.len());

        for lap_racetimes_player in lap_racetimes.iter() {
            let mut racetimes_player = vec![0.0];
            racetimes_player.extend(lap_racetimes_player.iter().take(tot_no_laps as usize));

            let mut laptimes_player = vec![0.0];
            laptimes_player.extend(racetimes_player.windows(2).map(|w| w[1] - w[0]));

            laptimes.push(laptimes_player);
            racetimes.push(racetimes_player);
        }

        RaceResult {
            tot_no_laps,
            player_names,
            laptimes,
            racetimes,
        }
    }

    /// The method returns whether the player completed all laps.
    pub fn has_finished(&self, player_idx: usize) -> bool {
        self.racetimes[player_idx].len() > self.tot_no_laps as usize
    }

    /// finishing_order returns the player indices sorted by final race time. Players that did not
    /// finish are put behind, ordered by the number of completed laps.
    pub fn finishing_order(&self) -> Vec<usize> {
        let ranking_keys: Vec<(f64, f64)> = self
            .racetimes
            .iter()
            .enumerate()
            .map(|(i, racetimes_player)| {
                if self.has_finished(i) {
                    (0.0, racetimes_player[self.tot_no_laps as usize])
                } else {
                    (1.0 / racetimes_player.len() as f64, f64::INFINITY)
                }
            })
            .collect();

        argsort(&ranking_keys, SortOrder::Ascending)
    }

    /// print_lap_and_race_times prints the resulting lap and race times to the console output.
    pub fn print_lap_and_race_times(&self) {
        let mut tmp_string_laptime = String::new();
        let mut tmp_string_racetime = String::new();

        for lap in 1..self.tot_no_laps as usize + 1 {
            tmp_string_laptime.push_str(&format!("{:3}, ", lap));
            tmp_string_racetime.push_str(&format!("{:3}, ", lap));

            let no_players = self.player_names.len();

            for i in 0..no_players {
                let sep = if i < no_players - 1 { ", " } else { "\n" };

                tmp_string_laptime.push_str(&format_time(self.laptimes[i].get(lap)));
                tmp_string_laptime.push_str(sep);
                tmp_string_racetime.push_str(&format_time(self.racetimes[i].get(lap)));
                tmp_string_racetime.push_str(sep);
            }
        }

        // create string with player info
        let tmp_string_player_info = format!("lap, {}", self.player_names.join(", "));

        // print everything to the console
        println!("RESULT: Lap times");
        println!("{}", tmp_string_player_info);
        println!("{}", tmp_string_laptime);

        println!("RESULT: Race times");
        println!("{}", tmp_string_player_info);
        println!("{}", tmp_string_racetime);

        println!("RESULT: Finishing order");
        for (pos, &i) in self.finishing_order().iter().enumerate() {
            let status = if self.has_finished(i) {
                format!("{:.3}s", self.racetimes[i][self.tot_no_laps as usize])
            } else {
                format!("DNF ({} laps)", self.racetimes[i].len() - 1)
            };
            println!("{:3}. {} {}", pos + 1, self.player_names[i], status);
        }
    }
}

fn format_time(t: Option<&f64>) -> String {
    match t {
        Some(t) => format!("{:8.3}s", t),
        None => format!("{:>9}", "-"),
    }
}
