mod test_round_trip_auto;
