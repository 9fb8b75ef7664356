use crate::ids::RecordIds;
use crate::io::records::{EventLog, HistoryLog, MeterState, RecordType, UNASSIGNED_ACCOUNT};

/// Append-only smart meter attached to a consumer.
///
/// Readings are copies of the value passed in; recording never changes
/// `power_through` or any battery.
#[derive(Debug, Clone)]
pub struct SmartMeter {
    id: u64,
    state: MeterState,
    lossy: bool,
    power_through: f64,
    history_logs: Vec<HistoryLog>,
    event_logs: Vec<EventLog>,
}

impl SmartMeter {
    /// Creates a meter in the `Shutdown` state.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: MeterState::Shutdown,
            lossy: false,
            power_through: 0.0,
            history_logs: Vec::new(),
            event_logs: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> MeterState {
        self.state
    }

    pub fn is_lossy(&self) -> bool {
        self.lossy
    }

    /// Energy that passed across the meter so far.
    pub fn power_through(&self) -> f64 {
        self.power_through
    }

    /// Accumulates energy passing across the meter.
    pub fn add_through(&mut self, energy: f64) {
        self.power_through += energy;
    }

    pub fn history_logs(&self) -> &[HistoryLog] {
        &self.history_logs
    }

    pub fn event_logs(&self) -> &[EventLog] {
        &self.event_logs
    }

    /// Appends a point-in-time reading stamped with `time`.
    pub fn record_history(
        &mut self,
        record_type: RecordType,
        time: u32,
        reading: f64,
        ids: &mut RecordIds,
    ) {
        self.history_logs.push(HistoryLog {
            record_type,
            lossy_aggregation: self.lossy,
            meter_id: self.id,
            account_number: UNASSIGNED_ACCOUNT,
            start_time: time,
            end_time: time,
            reading,
            record_id: ids.history.next_id(),
        });
    }

    /// Records the accumulated through-power as a reading.
    pub fn record_through(&mut self, time: u32, ids: &mut RecordIds) {
        let reading = self.power_through;
        self.record_history(RecordType::PowerThrough, time, reading, ids);
    }

    /// Moves to `new_state`, logging the change. Returns `false` if already there.
    pub fn transition(&mut self, new_state: MeterState, time: u32, ids: &mut RecordIds) -> bool {
        if self.state == new_state {
            return false;
        }
        self.event_logs.push(EventLog {
            previous_state: self.state,
            new_state,
            meter_id: self.id,
            time,
            record_id: ids.events.next_id(),
        });
        self.state = new_state;
        true
    }

    /// Brings a meter from `Shutdown` onto the power net.
    ///
    /// With `lossy` set, the meter passes through `AggregatingData` on the way
    /// so every later reading carries the lossy flag.
    pub fn power_on(&mut self, lossy: bool, time: u32, ids: &mut RecordIds) {
        self.transition(MeterState::Initialized, time, ids);
        self.set_lossy(lossy, time, ids);
        self.transition(MeterState::RunningOnPowerNet, time, ids);
    }

    /// Toggles lossy aggregation for subsequent readings.
    pub fn set_lossy(&mut self, lossy: bool, time: u32, ids: &mut RecordIds) {
        if self.lossy == lossy {
            return;
        }
        self.lossy = lossy;
        let state = if lossy {
            MeterState::AggregatingData
        } else {
            MeterState::NotAggregatingData
        };
        self.transition(state, time, ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_is_a_pure_read() {
        let mut ids = RecordIds::default();
        let mut meter = SmartMeter::new(1);
        meter.add_through(42.0);
        meter.record_through(0, &mut ids);
        meter.record_through(15, &mut ids);
        assert_eq!(meter.power_through(), 42.0);
        assert_eq!(meter.history_logs().len(), 2);
        assert!(meter.history_logs().iter().all(|l| l.reading == 42.0));
    }

    #[test]
    fn history_records_get_sequential_ids() {
        let mut ids = RecordIds::default();
        let mut meter = SmartMeter::new(5);
        meter.record_history(RecordType::PowerStored, 30, 1.0, &mut ids);
        meter.record_history(RecordType::PowerStored, 45, 2.0, &mut ids);
        let logs = meter.history_logs();
        assert_eq!(logs[0].record_id, 0);
        assert_eq!(logs[1].record_id, 1);
        assert_eq!(logs[1].meter_id, 5);
        assert_eq!(logs[1].start_time, 45);
        assert_eq!(logs[1].end_time, 45);
        assert_eq!(logs[1].account_number, UNASSIGNED_ACCOUNT);
    }

    #[test]
    fn transition_logs_only_changes() {
        let mut ids = RecordIds::default();
        let mut meter = SmartMeter::new(0);
        assert!(meter.transition(MeterState::Initialized, 0, &mut ids));
        assert!(!meter.transition(MeterState::Initialized, 15, &mut ids));
        assert_eq!(meter.event_logs().len(), 1);
        assert_eq!(meter.event_logs()[0].previous_state, MeterState::Shutdown);
    }

    #[test]
    fn power_on_walks_through_initialized() {
        let mut ids = RecordIds::default();
        let mut meter = SmartMeter::new(0);
        meter.power_on(false, 0, &mut ids);
        let states: Vec<_> = meter.event_logs().iter().map(|e| e.new_state).collect();
        assert_eq!(
            states,
            vec![MeterState::Initialized, MeterState::RunningOnPowerNet]
        );
        assert_eq!(meter.state(), MeterState::RunningOnPowerNet);
    }

    #[test]
    fn lossy_power_on_ends_on_the_power_net() {
        let mut ids = RecordIds::default();
        let mut meter = SmartMeter::new(0);
        meter.power_on(true, 0, &mut ids);
        let states: Vec<_> = meter.event_logs().iter().map(|e| e.new_state).collect();
        assert_eq!(
            states,
            vec![
                MeterState::Initialized,
                MeterState::AggregatingData,
                MeterState::RunningOnPowerNet
            ]
        );
        assert!(meter.is_lossy());
        meter.record_through(15, &mut ids);
        assert!(meter.history_logs()[0].lossy_aggregation);
    }

    #[test]
    fn lossy_flag_is_stamped_on_readings() {
        let mut ids = RecordIds::default();
        let mut meter = SmartMeter::new(0);
        meter.set_lossy(true, 0, &mut ids);
        meter.record_history(RecordType::PowerStored, 0, 1.0, &mut ids);
        assert!(meter.history_logs()[0].lossy_aggregation);
        assert_eq!(meter.state(), MeterState::AggregatingData);
    }
}
